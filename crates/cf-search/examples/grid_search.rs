//! Grid search over the ridge penalty on a synthetic regression problem,
//! first sequentially, then on a worker pool.
//!
//! Run with: `cargo run --example grid_search`

use std::sync::Arc;

use anyhow::Result;

use cf_engine::{RidgeRegression, TrainableFactory, WorkerPool};
use cf_search::{CrossValidator, SearchConfig};
use cf_types::{Dataset, Matrix};

fn synthetic_dataset(n: usize) -> Result<Dataset> {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            vec![t, (i % 17) as f64 / 17.0, ((i * 5) % 11) as f64 / 11.0]
        })
        .collect();
    let y: Vec<f64> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| 4.0 * r[0] - 1.5 * r[1] + 0.75 * r[2] + 0.02 * ((i % 7) as f64))
        .collect();
    Ok(Dataset::new(Matrix::from_rows(rows)?, y)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dataset = synthetic_dataset(400)?;
    let grid = vec![1e-4, 1e-2, 1.0, 100.0, 1e4];
    let config = SearchConfig::new().with_folds(8).with_seed(42);

    let validator = CrossValidator::new(config)?;
    let sequential = validator.run_sequential(&dataset, &grid, &RidgeRegression::factory())?;
    println!(
        "sequential: alpha = {:>10.4}  mean R² = {:.6}  ({} folds, {:?})",
        sequential.best.parameter,
        sequential.best.mean_score,
        sequential.best.contributing_folds,
        sequential.duration(),
    );

    let factory: Arc<dyn TrainableFactory> = Arc::new(RidgeRegression::factory());
    let pool = WorkerPool::new(4)?;
    let validator = CrossValidator::new(config)?;
    let parallel = validator.run_parallel(&dataset, &grid, &factory, &pool)?;
    println!(
        "parallel:   alpha = {:>10.4}  mean R² = {:.6}  ({} folds, {:?})",
        parallel.best.parameter,
        parallel.best.mean_score,
        parallel.best.contributing_folds,
        parallel.duration(),
    );

    for summary in &parallel.best.summaries {
        println!(
            "  alpha {:>10.4}: mean = {:?}, failed = {}, pending = {}",
            summary.parameter, summary.mean_score, summary.failed_folds, summary.pending_folds
        );
    }

    Ok(())
}
