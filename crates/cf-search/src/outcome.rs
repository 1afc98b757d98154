//! Search run records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cf_types::AggregateResult;

/// The record of one completed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub id: Uuid,
    pub best: AggregateResult,
    pub grid_size: usize,
    pub folds: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SearchOutcome {
    pub(crate) fn new(
        best: AggregateResult,
        grid_size: usize,
        folds: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            best,
            grid_size,
            folds,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
