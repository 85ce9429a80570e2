//! Dashboard state machine.
//!
//! ```text
//! NoData --start--> Loaded --select--> Filtered --render--> Rendered
//!    |                 ^                                       |
//!    +----> Error <----+------------- refresh -----------------+
//! ```
//!
//! Transitions consume the current state and return the next one, so the UI
//! holds a single value instead of ambient "refresh in progress" flags. A
//! refresh always drops the in-memory workbook before re-fetching; a refresh
//! that produces no artifact ends in `Error`, never in the old data.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::dashboard::frame::{ChartFrame, ChartSeries, NullSummary, date_to_x};
use crate::error::{AppError, ErrorKind};
use crate::io::workbook::{Workbook, read_workbook, remove_workbook};

/// Produces the workbook at `path` (normally: the fetch-and-write pipeline).
pub trait ArtifactBuilder {
    fn rebuild(&mut self, path: &Path) -> Result<(), AppError>;
}

/// Discriminant of [`DashboardState`], for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoData,
    Loaded,
    Filtered,
    Rendered,
    Error,
}

#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub path: PathBuf,
    pub workbook: Workbook,
}

impl LoadedWorkbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook.sheet_names()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.sheet_names().iter().position(|n| *n == name)
    }
}

/// The selected sheet plus the current item filter.
#[derive(Debug, Clone)]
pub struct SheetView {
    pub sheet: usize,
    pub name: String,
    pub frame: ChartFrame,
    pub selected_items: Vec<String>,
    /// Row indices into `frame.rows` that pass the filter.
    pub rows: Vec<usize>,
}

impl SheetView {
    fn new(loaded: &LoadedWorkbook, sheet: usize, items: Option<Vec<String>>) -> Option<Self> {
        let entry = loaded.workbook.sheets().get(sheet)?;
        let frame = ChartFrame::from_table(&entry.table);
        let selected_items = items.unwrap_or_else(|| frame.default_selection());
        let rows = frame.filter(&selected_items);
        Some(Self {
            sheet,
            name: entry.name.clone(),
            frame,
            selected_items,
            rows,
        })
    }

    fn with_items(mut self, items: Vec<String>) -> Self {
        self.rows = self.frame.filter(&items);
        self.selected_items = items;
        self
    }

    pub fn null_summary(&self) -> NullSummary {
        self.frame.null_summary(&self.rows)
    }

    /// First `limit` filtered rows, raw.
    pub fn raw_rows(&self, limit: usize) -> Vec<&[String]> {
        self.rows
            .iter()
            .filter_map(|&idx| self.frame.rows.get(idx))
            .take(limit)
            .map(|row| row.raw.as_slice())
            .collect()
    }

    pub fn outcome(&self) -> RenderOutcome {
        if !self.frame.has_required_columns() {
            return RenderOutcome::MissingColumns;
        }
        let series = self.frame.series(&self.rows);
        match ChartData::from_series(series) {
            Some(chart) => RenderOutcome::Chart(chart),
            None => RenderOutcome::NoData,
        }
    }
}

/// Series plus padded plot bounds (x in days, see [`date_to_x`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// `None` when no row has both a parsed date and a parsed value.
    pub fn from_series(series: Vec<ChartSeries>) -> Option<Self> {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(date, y) in series.iter().flat_map(|s| s.points.iter()) {
            let x = date_to_x(date);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !x_min.is_finite() || !y_min.is_finite() {
            return None;
        }

        // A single date or a flat line still needs a non-empty range.
        if x_max <= x_min {
            x_min -= 15.0;
            x_max += 15.0;
        }
        if y_max <= y_min {
            let pad = (y_min.abs() * 0.05).max(1.0);
            y_min -= pad;
            y_max += pad;
        }
        let pad = (y_max - y_min) * 0.05;

        Some(Self {
            series,
            x_bounds: [x_min, x_max],
            y_bounds: [y_min - pad, y_max + pad],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Chart(ChartData),
    /// Nothing to plot for this selection (normal, recoverable).
    NoData,
    /// The sheet has no recognizable date or value column.
    MissingColumns,
}

#[derive(Debug, Clone)]
pub enum DashboardState {
    NoData,
    Loaded(LoadedWorkbook),
    Filtered(LoadedWorkbook, SheetView),
    Rendered(LoadedWorkbook, SheetView, RenderOutcome),
    Error(AppError),
}

impl DashboardState {
    /// Session start: use the artifact if present, otherwise build it first.
    pub fn start(path: &Path, builder: &mut dyn ArtifactBuilder) -> Self {
        if !path.is_file() {
            info!("no workbook at {}, running fetch pipeline", path.display());
            if let Err(err) = builder.rebuild(path) {
                return DashboardState::Error(err);
            }
        }
        Self::load(path)
    }

    /// Delete the artifact, rebuild it, and load it again from disk.
    pub fn refresh(self, path: &Path, builder: &mut dyn ArtifactBuilder) -> Self {
        // The old workbook must not survive a failed refresh.
        drop(self);

        if let Err(err) = remove_workbook(path) {
            return DashboardState::Error(err);
        }
        if let Err(err) = builder.rebuild(path) {
            warn!("refresh failed: {err}");
            return DashboardState::Error(err);
        }
        Self::load(path)
    }

    fn load(path: &Path) -> Self {
        if !path.is_file() {
            return DashboardState::Error(AppError::new(
                ErrorKind::MissingArtifact,
                format!(
                    "No data could be collected; {} was not created. Press r to retry.",
                    path.display()
                ),
            ));
        }
        match read_workbook(path) {
            Ok(workbook) => DashboardState::Loaded(LoadedWorkbook {
                path: path.to_path_buf(),
                workbook,
            }),
            Err(err) => DashboardState::Error(err),
        }
    }

    /// Pick a sheet; `items = None` applies the default item selection.
    pub fn select(self, sheet: usize, items: Option<Vec<String>>) -> Self {
        let loaded = match self {
            DashboardState::Loaded(loaded)
            | DashboardState::Filtered(loaded, _)
            | DashboardState::Rendered(loaded, _, _) => loaded,
            other => return other,
        };
        match SheetView::new(&loaded, sheet, items) {
            Some(view) => DashboardState::Filtered(loaded, view),
            None => DashboardState::Loaded(loaded),
        }
    }

    /// Replace the item filter of the current sheet.
    pub fn set_items(self, items: Vec<String>) -> Self {
        match self {
            DashboardState::Filtered(loaded, view) | DashboardState::Rendered(loaded, view, _) => {
                DashboardState::Filtered(loaded, view.with_items(items))
            }
            other => other,
        }
    }

    pub fn render(self) -> Self {
        match self {
            DashboardState::Filtered(loaded, view) => {
                let outcome = view.outcome();
                DashboardState::Rendered(loaded, view, outcome)
            }
            other => other,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            DashboardState::NoData => Phase::NoData,
            DashboardState::Loaded(_) => Phase::Loaded,
            DashboardState::Filtered(..) => Phase::Filtered,
            DashboardState::Rendered(..) => Phase::Rendered,
            DashboardState::Error(_) => Phase::Error,
        }
    }

    pub fn workbook(&self) -> Option<&LoadedWorkbook> {
        match self {
            DashboardState::Loaded(loaded)
            | DashboardState::Filtered(loaded, _)
            | DashboardState::Rendered(loaded, _, _) => Some(loaded),
            DashboardState::NoData | DashboardState::Error(_) => None,
        }
    }

    pub fn view(&self) -> Option<&SheetView> {
        match self {
            DashboardState::Filtered(_, view) | DashboardState::Rendered(_, view, _) => Some(view),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&RenderOutcome> {
        match self {
            DashboardState::Rendered(_, _, outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            DashboardState::Error(err) => Some(err),
            _ => None,
        }
    }
}
