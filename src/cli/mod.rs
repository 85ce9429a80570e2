//! Command-line parsing for the `econ` indicator collector.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/workbook/dashboard code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Provider;
use crate::period::DEFAULT_LOOKBACK_YEARS;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "econ",
    version,
    about = "Korean macro indicators: fetch to a workbook, browse in a terminal dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (fetches first if the workbook is missing).
    Dashboard(DashboardArgs),
    /// Fetch every configured series and rewrite the workbook.
    Fetch(FetchArgs),
    /// List the sheets of the workbook.
    Sheets(WorkbookArgs),
    /// Print one sheet as a terminal chart with its null summary.
    Show(ShowArgs),
    /// Export one sheet to CSV.
    Export(ExportArgs),
}

/// Location of the persisted workbook.
#[derive(Debug, Args, Clone)]
pub struct WorkbookArgs {
    /// Workbook path (defaults to $ECON_WORKBOOK, then `macro_indicators.xlsx`).
    #[arg(short = 'w', long)]
    pub workbook: Option<PathBuf>,
}

/// What to fetch.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// JSON series catalog (defaults to the built-in catalog).
    #[arg(long, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Rolling lookback window in years.
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_YEARS)]
    pub lookback_years: u32,

    /// Only fetch series from these providers (repeatable).
    #[arg(long = "provider", value_enum)]
    pub providers: Vec<Provider>,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub workbook: WorkbookArgs,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub workbook: WorkbookArgs,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub workbook: WorkbookArgs,

    /// Sheet name or 1-based index (prompts when omitted).
    #[arg(short = 's', long)]
    pub sheet: Option<String>,

    /// Item to plot (repeatable). Defaults to the first item of the sheet.
    #[arg(short = 'i', long = "item")]
    pub items: Vec<String>,

    /// Plot every item of the sheet.
    #[arg(long, conflicts_with = "items")]
    pub all_items: bool,

    /// Also print the first raw rows.
    #[arg(long)]
    pub raw: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub workbook: WorkbookArgs,

    /// Sheet name or 1-based index.
    #[arg(short = 's', long)]
    pub sheet: String,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_repeated_items() {
        let cli = Cli::parse_from(["econ", "show", "-s", "2", "-i", "총지수", "-i", "식료품", "--raw"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.sheet.as_deref(), Some("2"));
        assert_eq!(args.items, vec!["총지수", "식료품"]);
        assert!(args.raw);
    }

    #[test]
    fn fetch_defaults_and_provider_filter() {
        let cli = Cli::parse_from(["econ", "fetch", "--provider", "central-bank", "-w", "x.xlsx"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.source.lookback_years, DEFAULT_LOOKBACK_YEARS);
        assert_eq!(args.source.providers, vec![Provider::CentralBank]);
        assert_eq!(args.workbook.workbook, Some(PathBuf::from("x.xlsx")));
    }

    #[test]
    fn all_items_conflicts_with_item() {
        let res = Cli::try_parse_from(["econ", "show", "--all-items", "-i", "a"]);
        assert!(res.is_err());
    }
}
