//! Materialization of fold splits into a fold store.

use tracing::{debug, warn};

use cf_types::{CfResult, Dataset};

use crate::plan::FoldSplit;
use crate::store::{FoldData, FoldHandle, FoldStore};

/// Gather the four arrays for each split and write them to the store.
///
/// Handles come back in fold order, one per surviving split; they stay
/// valid for the whole search and are read once per grid entry without
/// mutation. A write failure drops that fold's contribution to every
/// parameter but never aborts the wider search, so the handle list may be
/// shorter than the split list.
pub fn materialize(
    dataset: &Dataset,
    splits: &[FoldSplit],
    store: &dyn FoldStore,
) -> CfResult<Vec<FoldHandle>> {
    let mut handles = Vec::with_capacity(splits.len());

    for split in splits {
        let (x_train, y_train) = dataset.select(&split.train_index)?;
        let (x_test, y_test) = dataset.select(&split.test_index)?;

        let handle = match store.put(
            split.fold_index,
            FoldData {
                x_train,
                y_train,
                x_test,
                y_test,
            },
        ) {
            Ok(handle) => handle,
            Err(error) => {
                warn!(fold = split.fold_index, %error, "fold write failed, skipping fold");
                continue;
            }
        };

        debug!(
            fold = split.fold_index,
            train = split.train_index.len(),
            test = split.test_index.len(),
            "materialized fold"
        );
        handles.push(handle);
    }

    Ok(handles)
}
