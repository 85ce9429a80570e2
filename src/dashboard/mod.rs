//! Dashboard core, independent of any terminal or widget code.
//!
//! - cell parsing (`parse`)
//! - chart-ready sheet view (`frame`)
//! - session state machine (`state`)
//!
//! The TUI and the `show` command are both thin presenters over this module.

pub mod frame;
pub mod parse;
pub mod state;

pub use frame::{ChartFrame, ChartRow, ChartSeries, NullSummary, date_to_x, x_to_date};
pub use parse::{ParsedValue, parse_period_date, parse_value};
pub use state::{ArtifactBuilder, ChartData, DashboardState, LoadedWorkbook, Phase, RenderOutcome, SheetView};

/// Rows shown in the raw-data panel.
pub const RAW_PREVIEW_ROWS: usize = 10;
