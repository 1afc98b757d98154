use serde::{Deserialize, Serialize};

use crate::errors::CfResult;
use crate::validation_error;

/// Row-major dense feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build a matrix from row vectors. All rows must share one length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> CfResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(validation_error!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n_cols
                ));
            }
            data.extend(row);
        }

        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n_cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n_cols + j] = value;
    }

    /// Gather the given rows into a new matrix. Indices may repeat; each
    /// occurrence produces its own output row.
    pub fn select_rows(&self, indices: &[usize]) -> CfResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &i in indices {
            if i >= self.n_rows {
                return Err(validation_error!(
                    "row index {} out of bounds for matrix with {} rows",
                    i,
                    self.n_rows
                ));
            }
            data.extend_from_slice(self.row(i));
        }

        Ok(Matrix {
            n_rows: indices.len(),
            n_cols: self.n_cols,
            data,
        })
    }
}

/// A feature matrix paired with its target vector. Immutable for the whole
/// search; owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: Matrix,
    pub y: Vec<f64>,
}

impl Dataset {
    pub fn new(x: Matrix, y: Vec<f64>) -> CfResult<Self> {
        if x.n_rows() != y.len() {
            return Err(validation_error!(
                "feature matrix has {} rows but target vector has {} values",
                x.n_rows(),
                y.len()
            ));
        }
        Ok(Self { x, y })
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    /// Gather the rows and targets at the given indices.
    pub fn select(&self, indices: &[usize]) -> CfResult<(Matrix, Vec<f64>)> {
        let x = self.x.select_rows(indices)?;
        let mut y = Vec::with_capacity(indices.len());
        for &i in indices {
            y.push(
                *self
                    .y
                    .get(i)
                    .ok_or_else(|| validation_error!("target index {} out of bounds", i))?,
            );
        }
        Ok((x, y))
    }
}
