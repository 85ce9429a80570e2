//! Terminal plotting (no widgets; plain text).

pub mod ascii;

pub use ascii::{marker_for, render_ascii_chart};
