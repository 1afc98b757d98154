//! Search orchestration: sequential and parallel evaluation of the
//! parameter grid × fold set cross product.

use std::sync::Arc;

use tracing::{info, warn};

use cf_folds::{FoldHandle, FoldStore};
use cf_types::{validation_error, CfResult, TaskError};

use crate::pool::{ScoreJob, TaskPool};
use crate::scorer::score_fold;
use crate::task::ScoreTask;
use crate::trainable::TrainableFactory;

/// A `len(grid) × k` table of score tasks.
///
/// Cell `[grid_index][fold_index]` always belongs to `grid[grid_index]` and
/// fold `fold_index` — pairing is by position, never by completion order.
#[derive(Debug)]
pub struct ScoreMatrix {
    grid: Vec<f64>,
    fold_count: usize,
    cells: Vec<Vec<ScoreTask>>,
}

impl ScoreMatrix {
    /// Assemble a matrix from externally produced cells (custom pools,
    /// tests). Shape must match the grid and fold count exactly.
    pub fn from_cells(
        grid: Vec<f64>,
        fold_count: usize,
        cells: Vec<Vec<ScoreTask>>,
    ) -> CfResult<Self> {
        if cells.len() != grid.len() {
            return Err(validation_error!(
                "score matrix has {} rows for a grid of {}",
                cells.len(),
                grid.len()
            ));
        }
        if let Some(row) = cells.iter().find(|row| row.len() != fold_count) {
            return Err(validation_error!(
                "score matrix row has {} cells, expected {}",
                row.len(),
                fold_count
            ));
        }
        Ok(Self {
            grid,
            fold_count,
            cells,
        })
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn fold_count(&self) -> usize {
        self.fold_count
    }

    /// The tasks for one grid entry, in fold order.
    pub fn row(&self, grid_index: usize) -> &[ScoreTask] {
        &self.cells[grid_index]
    }

    /// Block until every cell has resolved to a score or a failure.
    pub fn wait_all(&self) {
        for row in &self.cells {
            for cell in row {
                cell.wait();
            }
        }
    }
}

/// Runs the (parameter, fold) cross product against a fold store.
pub struct Evaluator {
    store: Arc<dyn FoldStore>,
}

impl Evaluator {
    pub fn new(store: Arc<dyn FoldStore>) -> Self {
        Self { store }
    }

    /// Sequential strategy: grid order, fold order, one blocking call per
    /// cell. Results come back already resolved.
    pub fn sequential(
        &self,
        grid: &[f64],
        handles: &[FoldHandle],
        factory: &dyn TrainableFactory,
    ) -> ScoreMatrix {
        info!(
            grid = grid.len(),
            folds = handles.len(),
            "sequential evaluation"
        );

        let cells = grid
            .iter()
            .map(|&parameter| {
                handles
                    .iter()
                    .map(|&handle| {
                        match score_fold(self.store.as_ref(), handle, factory, parameter) {
                            Ok(score) => ScoreTask::ready(parameter, handle.fold_index, score),
                            Err(error) => {
                                warn!(parameter, fold = handle.fold_index, %error, "cell failed");
                                ScoreTask::failed(parameter, handle.fold_index, error)
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        ScoreMatrix {
            grid: grid.to_vec(),
            fold_count: handles.len(),
            cells,
        }
    }

    /// Parallel strategy: the same cross product in the same order, but
    /// every cell is submitted to the pool up front — eagerly, with no
    /// throttling or batching — and stored as a pending task. A rejected
    /// submission becomes a failed cell; there is no sequential fallback.
    pub fn parallel(
        &self,
        grid: &[f64],
        handles: &[FoldHandle],
        factory: &Arc<dyn TrainableFactory>,
        pool: &dyn TaskPool,
    ) -> ScoreMatrix {
        info!(
            grid = grid.len(),
            folds = handles.len(),
            "parallel evaluation, submitting all tasks"
        );

        let cells = grid
            .iter()
            .map(|&parameter| {
                handles
                    .iter()
                    .map(|&handle| {
                        let store = Arc::clone(&self.store);
                        let factory = Arc::clone(factory);
                        let job: ScoreJob = Box::new(move || {
                            score_fold(store.as_ref(), handle, factory.as_ref(), parameter)
                        });

                        match pool.submit(parameter, handle.fold_index, job) {
                            Ok(task) => task,
                            Err(error) => {
                                warn!(
                                    parameter,
                                    fold = handle.fold_index,
                                    %error,
                                    "submission rejected"
                                );
                                ScoreTask::failed(
                                    parameter,
                                    handle.fold_index,
                                    TaskError::Scheduling(error),
                                )
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        ScoreMatrix {
            grid: grid.to_vec(),
            fold_count: handles.len(),
            cells,
        }
    }
}
