//! The estimator capability consumed by the scorer.

use cf_types::{CfResult, Matrix};

/// A single-hyperparameter estimator. Implementations adapt whatever
/// modeling code the caller brings; the search never looks inside.
pub trait Trainable: Send {
    /// Fit the model on training data.
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> CfResult<()>;

    /// Held-out goodness-of-fit for a fitted model (higher is better).
    fn score(&self, x: &Matrix, y: &[f64]) -> CfResult<f64>;
}

/// Constructs a fresh, stateless model configured with one scalar
/// hyperparameter value. Must be callable from any worker.
pub trait TrainableFactory: Send + Sync {
    fn build(&self, parameter: f64) -> CfResult<Box<dyn Trainable>>;
}

impl<F> TrainableFactory for F
where
    F: Fn(f64) -> CfResult<Box<dyn Trainable>> + Send + Sync,
{
    fn build(&self, parameter: f64) -> CfResult<Box<dyn Trainable>> {
        self(parameter)
    }
}
