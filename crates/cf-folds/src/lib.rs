//! # cf-folds
//!
//! Fold generation and durable fold storage for Crossfold.
//!
//! Provides randomized train/test split planning with an explicit, named
//! sampling policy, plus pluggable fold store backends (shared in-memory
//! and on-disk JSON) that let many workers read fold data concurrently.

pub mod materialize;
pub mod plan;
pub mod store;

pub use materialize::*;
pub use plan::*;
pub use store::*;
