//! # cf-engine
//!
//! Scoring primitives and search orchestration for Crossfold.
//!
//! Provides the `Trainable` capability seam, a per-(parameter, fold) scoring
//! primitive that resolves fold data through the store, a poll-based task
//! abstraction shared by both execution strategies, a crossbeam-backed
//! worker pool, and the sequential/parallel orchestrators that produce a
//! grid-ordered score matrix.

pub mod evaluate;
pub mod pool;
pub mod ridge;
pub mod scorer;
pub mod task;
pub mod trainable;

pub use evaluate::*;
pub use pool::*;
pub use ridge::*;
pub use scorer::*;
pub use task::*;
pub use trainable::*;
