//! The per-fold, per-parameter scoring primitive.

use tracing::debug;

use cf_folds::{FoldHandle, FoldStore};
use cf_types::{TaskError, TrainingFailure};

use crate::trainable::TrainableFactory;

/// Train one model with one hyperparameter value on one fold's training
/// data and return its held-out score.
///
/// The fold handle is resolved through the store inside the call and the
/// function touches no shared mutable state, so it can run unchanged in an
/// isolated worker. Every failure along the way becomes a [`TaskError`]
/// for this cell alone; it never aborts the wider search.
pub fn score_fold(
    store: &dyn FoldStore,
    handle: FoldHandle,
    factory: &dyn TrainableFactory,
    parameter: f64,
) -> Result<f64, TaskError> {
    let data = store.get(handle).map_err(TaskError::Storage)?;

    let training_failure = |cause: String| {
        TaskError::Training(TrainingFailure {
            parameter,
            fold_index: handle.fold_index,
            cause,
        })
    };

    let mut model = factory
        .build(parameter)
        .map_err(|e| training_failure(e.to_string()))?;
    model
        .fit(&data.x_train, &data.y_train)
        .map_err(|e| training_failure(e.to_string()))?;
    let score = model
        .score(&data.x_test, &data.y_test)
        .map_err(|e| training_failure(e.to_string()))?;

    debug!(parameter, fold = handle.fold_index, score, "scored fold");
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ridge::RidgeRegression;
    use cf_folds::{materialize, plan, MemoryFoldStore, SamplingPolicy};
    use cf_types::{Dataset, Matrix, StorageError};

    fn stored_fold(store: &MemoryFoldStore) -> FoldHandle {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| 3.0 * i as f64 + 2.0).collect();
        let dataset = Dataset::new(Matrix::from_rows(rows).unwrap(), y).unwrap();

        let splits = plan::generate(40, 1, 0.25, 17, SamplingPolicy::BootstrapIndependent).unwrap();
        materialize(&dataset, &splits, store).unwrap()[0]
    }

    #[test]
    fn scores_a_stored_fold() {
        let store = MemoryFoldStore::new();
        let handle = stored_fold(&store);

        let score = score_fold(&store, handle, &RidgeRegression::factory(), 1e-6).unwrap();
        assert!(score > 0.99, "linear data should score near 1, got {score}");
    }

    #[test]
    fn storage_failures_are_classified() {
        let store = MemoryFoldStore::new();
        let handle = stored_fold(&store);
        let other_store = MemoryFoldStore::new();

        let err = score_fold(&other_store, handle, &RidgeRegression::factory(), 1.0).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Storage(StorageError::UnknownHandle(_))
        ));
    }

    #[test]
    fn construction_failures_become_training_failures() {
        let store = MemoryFoldStore::new();
        let handle = stored_fold(&store);

        // Negative penalty is rejected at construction time.
        let err = score_fold(&store, handle, &RidgeRegression::factory(), -1.0).unwrap_err();
        match err {
            TaskError::Training(failure) => {
                assert_eq!(failure.parameter, -1.0);
                assert_eq!(failure.fold_index, handle.fold_index);
            }
            other => panic!("expected training failure, got {other:?}"),
        }
    }
}
