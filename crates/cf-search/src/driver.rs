//! End-to-end search driver.
//!
//! `CrossValidator` ties the pipeline together: plan folds, materialize
//! them into the store, run the grid × fold cross product, and select the
//! winning parameter.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use cf_engine::{Evaluator, ScoreMatrix, TaskPool, TrainableFactory};
use cf_folds::{materialize, plan, FoldHandle, FoldStore, MemoryFoldStore};
use cf_types::{validation_error, CfResult, Dataset};

use crate::config::SearchConfig;
use crate::outcome::SearchOutcome;
use crate::selector;

/// Drives one cross-validated parameter search over a fold store.
pub struct CrossValidator {
    config: SearchConfig,
    store: Arc<dyn FoldStore>,
}

impl CrossValidator {
    /// Build a validator backed by an in-memory fold store.
    pub fn new(config: SearchConfig) -> CfResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: Arc::new(MemoryFoldStore::new()),
        })
    }

    /// Swap in a different fold store, e.g. `DiskFoldStore` for datasets
    /// that should not stay resident.
    pub fn with_store(mut self, store: Arc<dyn FoldStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn FoldStore> {
        Arc::clone(&self.store)
    }

    /// Plan the folds for `dataset` and write them to the store. Handles
    /// come back in fold order and stay valid for the whole search; a fold
    /// whose write fails is skipped rather than aborting the run.
    pub fn prepare(&self, dataset: &Dataset, grid: &[f64]) -> CfResult<Vec<FoldHandle>> {
        if grid.is_empty() {
            return Err(validation_error!("parameter grid is empty"));
        }

        let splits = plan::generate(
            dataset.n_samples(),
            self.config.folds,
            self.config.test_size,
            self.config.seed,
            self.config.policy,
        )?;
        materialize(dataset, &splits, self.store.as_ref())
    }

    /// Run the whole search on the calling thread: one blocking train/score
    /// per cell, grid order then fold order.
    pub fn run_sequential(
        &self,
        dataset: &Dataset,
        grid: &[f64],
        factory: &dyn TrainableFactory,
    ) -> CfResult<SearchOutcome> {
        let started_at = Utc::now();
        let handles = self.prepare(dataset, grid)?;

        let evaluator = Evaluator::new(self.store());
        let matrix = evaluator.sequential(grid, &handles, factory);
        let best = selector::select(&matrix)?;

        info!(
            parameter = best.parameter,
            mean_score = best.mean_score,
            "sequential search complete"
        );
        Ok(SearchOutcome::new(
            best,
            grid.len(),
            self.config.folds,
            started_at,
        ))
    }

    /// Submit every cell to `pool` and return the still-resolving matrix.
    /// Callers poll or `wait_all` at their own pace; `selector::select`
    /// on a partially resolved matrix yields a provisional result.
    pub fn submit_parallel(
        &self,
        dataset: &Dataset,
        grid: &[f64],
        factory: &Arc<dyn TrainableFactory>,
        pool: &dyn TaskPool,
    ) -> CfResult<ScoreMatrix> {
        let handles = self.prepare(dataset, grid)?;
        let evaluator = Evaluator::new(self.store());
        Ok(evaluator.parallel(grid, &handles, factory, pool))
    }

    /// Run the whole search on `pool` and block until every cell resolves.
    ///
    /// With the same config and seed this selects the same parameter as
    /// `run_sequential`, with mean scores equal to within float tolerance.
    pub fn run_parallel(
        &self,
        dataset: &Dataset,
        grid: &[f64],
        factory: &Arc<dyn TrainableFactory>,
        pool: &dyn TaskPool,
    ) -> CfResult<SearchOutcome> {
        let started_at = Utc::now();

        let matrix = self.submit_parallel(dataset, grid, factory, pool)?;
        matrix.wait_all();
        let best = selector::select(&matrix)?;

        info!(
            parameter = best.parameter,
            mean_score = best.mean_score,
            "parallel search complete"
        );
        Ok(SearchOutcome::new(
            best,
            grid.len(),
            self.config.folds,
            started_at,
        ))
    }
}
