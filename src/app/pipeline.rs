//! Shared "fetch-and-write" pipeline used by both the CLI and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! catalog -> period window -> sequential fetch -> workbook -> `.xlsx`
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::Settings;
use crate::dashboard::ArtifactBuilder;
use crate::domain::{SeriesRequest, SeriesSpec};
use crate::error::AppError;
use crate::io::workbook::{Workbook, WriteOutcome, write_workbook};
use crate::period::PeriodWindow;
use crate::providers::{Fetcher, SkippedSeries};

/// All outputs of a single fetch run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub path: PathBuf,
    pub window: PeriodWindow,
    pub requested: usize,
    /// Sheet names actually written, in workbook order.
    pub sheets: Vec<String>,
    pub skipped: Vec<SkippedSeries>,
    /// Fetched titles whose sheet name collided with an earlier one.
    pub overwritten: Vec<String>,
    pub outcome: WriteOutcome,
}

pub struct Pipeline {
    fetcher: Fetcher,
    catalog: Vec<SeriesSpec>,
    lookback_years: u32,
}

impl Pipeline {
    pub fn new(settings: &Settings, catalog: Vec<SeriesSpec>, lookback_years: u32) -> Self {
        Self {
            fetcher: Fetcher::new(settings.credentials.clone(), settings.endpoints.clone()),
            catalog,
            lookback_years,
        }
    }

    /// Run with a window ending today.
    pub fn run(&self, path: &Path) -> Result<RunOutput, AppError> {
        self.run_with_window(path, &PeriodWindow::today(self.lookback_years))
    }

    pub fn run_with_window(&self, path: &Path, window: &PeriodWindow) -> Result<RunOutput, AppError> {
        let requests: Vec<SeriesRequest> = self.catalog.iter().map(|s| s.resolve(window)).collect();
        info!(
            "fetching {} series (months {}..{}, quarters {}..{})",
            requests.len(),
            window.start_month,
            window.end_month,
            window.start_quarter,
            window.end_quarter
        );

        let report = self.fetcher.fetch_all(&requests);

        let mut workbook = Workbook::new();
        let mut overwritten = Vec::new();
        for series in report.series {
            if workbook.insert(&series.title, series.table).is_some() {
                warn!("sheet for '{}' replaced an earlier sheet with the same name", series.title);
                overwritten.push(series.title);
            }
        }

        let outcome = write_workbook(path, &workbook)?;
        match outcome {
            WriteOutcome::Written { sheets } => {
                info!("saved {sheets} sheet(s) to {}", path.display());
            }
            WriteOutcome::NothingToPersist => {
                warn!("no series fetched; {} not written", path.display());
            }
        }

        Ok(RunOutput {
            path: path.to_path_buf(),
            window: window.clone(),
            requested: requests.len(),
            sheets: workbook.sheet_names().into_iter().map(str::to_string).collect(),
            skipped: report.skipped,
            overwritten,
            outcome,
        })
    }
}

impl ArtifactBuilder for Pipeline {
    fn rebuild(&mut self, path: &Path) -> Result<(), AppError> {
        self.run(path).map(|_| ())
    }
}
