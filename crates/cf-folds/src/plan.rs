//! Randomized train/test fold planning.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use cf_types::{validation_error, CfResult};

/// How fold indices are drawn from `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Independent uniform draws **with replacement** for both the train and
    /// test index sets. Index sets may contain duplicates and may overlap
    /// between train and test. This matches the historical behaviour and is
    /// the default; do not switch it silently.
    BootstrapIndependent,

    /// Shuffle `[0, n)` once per fold and cut it into disjoint test/train
    /// parts. The train part takes every index not in the test part, so its
    /// length is `n - round(n * test_size)` rather than the bootstrap
    /// policy's independent `round(n * (1 - test_size))`.
    DisjointShuffle,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::BootstrapIndependent
    }
}

/// One randomized train/test split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSplit {
    pub fold_index: usize,
    pub train_index: Vec<usize>,
    pub test_index: Vec<usize>,
}

/// Generate `k` randomized fold splits for a dataset of `n` samples.
///
/// A single random stream is seeded once per call and consumed sequentially
/// across all folds, train indices before test indices within each fold.
/// Two calls with identical arguments yield bit-identical index sequences.
pub fn generate(
    n: usize,
    k: usize,
    test_size: f64,
    seed: u64,
    policy: SamplingPolicy,
) -> CfResult<Vec<FoldSplit>> {
    if k == 0 {
        return Err(validation_error!("fold count must be positive, got 0"));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(validation_error!(
            "test_size must lie in (0, 1), got {}",
            test_size
        ));
    }
    if n == 0 {
        return Err(validation_error!("dataset must contain at least one sample"));
    }

    let n_test = (n as f64 * test_size).round() as usize;
    let n_train = (n as f64 * (1.0 - test_size)).round() as usize;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut folds = Vec::with_capacity(k);

    for fold_index in 0..k {
        let (train_index, test_index) = match policy {
            SamplingPolicy::BootstrapIndependent => {
                let train: Vec<usize> = (0..n_train).map(|_| rng.gen_range(0..n)).collect();
                let test: Vec<usize> = (0..n_test).map(|_| rng.gen_range(0..n)).collect();
                (train, test)
            }
            SamplingPolicy::DisjointShuffle => {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(&mut rng);
                let test = order[..n_test].to_vec();
                let train = order[n_test..].to_vec();
                (train, test)
            }
        };

        folds.push(FoldSplit {
            fold_index,
            train_index,
            test_index,
        });
    }

    Ok(folds)
}
