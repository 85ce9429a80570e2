//! `econ-dash` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - the fetch pipeline and the dashboard core are testable without a terminal
//! - the TUI and the batch commands share one implementation of each step

pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod io;
pub mod period;
pub mod plot;
pub mod providers;
pub mod report;
pub mod table;
pub mod tui;
