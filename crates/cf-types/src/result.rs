use serde::{Deserialize, Serialize};

/// Per-parameter aggregation snapshot at one poll of the score matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub parameter: f64,

    /// Mean over resolved, successful folds; `None` when no fold has
    /// contributed yet.
    pub mean_score: Option<f64>,

    /// Number of folds included in the mean (0..=k).
    pub contributing_folds: usize,

    /// Folds whose evaluation failed. Excluded from both numerator and
    /// denominator, never counted as zero.
    pub failed_folds: usize,

    /// Folds still unresolved at poll time.
    pub pending_folds: usize,
}

/// The sole output of a search: the winning parameter and its aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub parameter: f64,
    pub mean_score: f64,

    /// Always k in sequential mode; 0 < count <= k in parallel mode.
    pub contributing_folds: usize,

    /// Set when the winner is missing fold contributions or any task
    /// pool-wide was still unresolved at selection time. A provisional
    /// result may change as more tasks complete.
    pub provisional: bool,

    /// Per-parameter detail in original grid order.
    pub summaries: Vec<ParameterSummary>,
}
