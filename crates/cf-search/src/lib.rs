//! # cf-search
//!
//! Score aggregation, parameter selection, and the end-to-end search driver
//! for Crossfold.
//!
//! The selector reduces a score matrix to the winning parameter by one
//! non-blocking poll per cell, tolerating failed and still-pending cells;
//! the driver wires fold planning, materialization, evaluation, and
//! selection into one call.

pub mod config;
pub mod driver;
pub mod outcome;
pub mod selector;

pub use config::*;
pub use driver::*;
pub use outcome::*;
pub use selector::*;
