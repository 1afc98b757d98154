//! # cf-types
//!
//! Core data structures, results, and the error taxonomy shared by every
//! Crossfold crate.

pub mod dataset;
pub mod errors;
pub mod result;

pub use dataset::*;
pub use errors::*;
pub use result::*;
