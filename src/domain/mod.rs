//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - provider and frequency enums (`Provider`, `Granularity`)
//! - configured series entries (`SeriesSpec`) and their per-run form (`SeriesRequest`)
//! - the built-in series catalog

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
