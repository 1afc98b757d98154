//! Ridge regression — the bundled `Trainable` adapter.
//!
//! Fits by solving the regularized normal equations on centered data, so
//! the intercept is never penalized. `score` reports the coefficient of
//! determination (R²) on held-out data.

use cf_types::{internal_error, validation_error, CfResult, Matrix};

use crate::trainable::{Trainable, TrainableFactory};

#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    coefficients: Vec<f64>,
    intercept: f64,
    fitted: bool,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> CfResult<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(validation_error!(
                "ridge penalty must be finite and non-negative, got {}",
                alpha
            ));
        }
        Ok(Self {
            alpha,
            coefficients: Vec::new(),
            intercept: 0.0,
            fitted: false,
        })
    }

    /// Factory wiring the penalty strength as the searched hyperparameter.
    pub fn factory() -> impl TrainableFactory {
        |alpha: f64| -> CfResult<Box<dyn Trainable>> { Ok(Box::new(RidgeRegression::new(alpha)?)) }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

impl Trainable for RidgeRegression {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> CfResult<()> {
        let n = x.n_rows();
        let p = x.n_cols();

        if n != y.len() {
            return Err(validation_error!(
                "training data has {} rows but {} targets",
                n,
                y.len()
            ));
        }
        if n == 0 {
            return Err(validation_error!("cannot fit on an empty training set"));
        }

        let mut x_mean = vec![0.0; p];
        for i in 0..n {
            let row = x.row(i);
            for j in 0..p {
                x_mean[j] += row[j];
            }
        }
        for m in &mut x_mean {
            *m /= n as f64;
        }
        let y_mean = y.iter().sum::<f64>() / n as f64;

        // Gram matrix of centered features plus the ridge penalty on the
        // diagonal, and the centered cross-moment on the right-hand side.
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        for i in 0..n {
            let row = x.row(i);
            let yc = y[i] - y_mean;
            for j in 0..p {
                let xj = row[j] - x_mean[j];
                rhs[j] += xj * yc;
                for l in j..p {
                    gram[j][l] += xj * (row[l] - x_mean[l]);
                }
            }
        }
        for j in 0..p {
            for l in 0..j {
                gram[j][l] = gram[l][j];
            }
            gram[j][j] += self.alpha;
        }

        let coefficients = solve(gram, rhs)?;
        self.intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();
        self.coefficients = coefficients;
        self.fitted = true;
        Ok(())
    }

    fn score(&self, x: &Matrix, y: &[f64]) -> CfResult<f64> {
        if !self.fitted {
            return Err(validation_error!("model must be fitted before scoring"));
        }
        if x.n_rows() != y.len() {
            return Err(validation_error!(
                "test data has {} rows but {} targets",
                x.n_rows(),
                y.len()
            ));
        }
        if x.n_cols() != self.coefficients.len() {
            return Err(validation_error!(
                "test data has {} features but the model was fitted on {}",
                x.n_cols(),
                self.coefficients.len()
            ));
        }
        if y.is_empty() {
            return Err(validation_error!("cannot score an empty test set"));
        }

        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (i, &yi) in y.iter().enumerate() {
            let residual = yi - self.predict_row(x.row(i));
            ss_res += residual * residual;
            let dev = yi - y_mean;
            ss_tot += dev * dev;
        }

        if ss_tot == 0.0 {
            // Constant target: perfect when residuals vanish, 0 otherwise.
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> CfResult<Vec<f64>> {
    let p = b.len();

    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() < 1e-12 {
            return Err(internal_error!(
                "normal equations are singular at column {}",
                col
            ));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..p {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for l in col..p {
                a[row][l] -= factor * a[col][l];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = vec![0.0; p];
    for col in (0..p).rev() {
        let mut value = b[col];
        for l in (col + 1)..p {
            value -= a[col][l] * solution[l];
        }
        solution[col] = value / a[col][col];
    }
    Ok(solution)
}
