//! Search configuration.

use serde::{Deserialize, Serialize};

use cf_folds::SamplingPolicy;
use cf_types::{validation_error, CfResult};

/// Fold-count and split configuration for one search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of folds (k).
    pub folds: usize,

    /// Fraction of samples drawn into each test set.
    pub test_size: f64,

    /// Seed for the fold-planning random stream. Identical seeds yield
    /// identical splits across searches.
    pub seed: u64,

    /// Index sampling policy.
    pub policy: SamplingPolicy,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self {
            folds: 10,
            test_size: 0.25,
            seed: 0,
            policy: SamplingPolicy::default(),
        }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reject malformed configuration before any work is scheduled.
    pub fn validate(&self) -> CfResult<()> {
        if self.folds == 0 {
            return Err(validation_error!("fold count must be positive, got 0"));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(validation_error!(
                "test_size must lie in (0, 1), got {}",
                self.test_size
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}
