//! Input/output helpers.
//!
//! - the persisted `.xlsx` workbook: write, read, delete (`workbook`)
//! - single-sheet CSV export (`export`)

pub mod export;
pub mod workbook;

pub use export::*;
pub use workbook::*;
