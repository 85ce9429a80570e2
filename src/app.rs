//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - builds settings and the series catalog
//! - runs the fetch pipeline or opens the persisted workbook
//! - prints reports/plots or hands over to the TUI

use std::path::PathBuf;

use clap::Parser;
use log::debug;

use crate::cli::picker::{prompt_for_sheet, resolve_sheet};
use crate::cli::{Cli, Command, DashboardArgs, ExportArgs, FetchArgs, ShowArgs, SourceArgs, WorkbookArgs};
use crate::config::Settings;
use crate::dashboard::{DashboardState, LoadedWorkbook, RAW_PREVIEW_ROWS, RenderOutcome};
use crate::domain::{SeriesSpec, default_catalog, load_catalog};
use crate::error::{AppError, ErrorKind};
use crate::io::workbook::{WriteOutcome, read_workbook};

pub mod pipeline;

use pipeline::Pipeline;

/// Cell width used by `econ show --raw`.
const RAW_CELL_WIDTH: usize = 14;

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    // We want `econ` and `econ -w data.xlsx` to behave like `econ dashboard ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_logging(&cli.command);

    match cli.command {
        Command::Dashboard(args) => handle_dashboard(args),
        Command::Fetch(args) => handle_fetch(args),
        Command::Sheets(args) => handle_sheets(args),
        Command::Show(args) => handle_show(args),
        Command::Export(args) => handle_export(args),
    }
}

/// `info` for batch commands; the dashboard stays quiet so log lines do not
/// tear the alternate screen. `RUST_LOG` overrides both.
fn init_logging(command: &Command) {
    let default_filter = match command {
        Command::Dashboard(_) => "off",
        _ => "info",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).try_init();
}

fn handle_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let settings = settings_for(&args.workbook);
    let catalog = catalog_for(&args.source)?;
    let pipeline = Pipeline::new(&settings, catalog, args.source.lookback_years);
    crate::tui::run(settings.workbook, pipeline)
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let settings = settings_for(&args.workbook);
    let catalog = catalog_for(&args.source)?;
    let pipeline = Pipeline::new(&settings, catalog, args.source.lookback_years);

    let run = pipeline.run(&settings.workbook)?;
    println!("{}", crate::report::format_fetch_report(&run));

    if run.outcome == WriteOutcome::NothingToPersist {
        return Err(AppError::new(
            ErrorKind::MissingArtifact,
            format!("No series could be fetched; {} was not written.", settings.workbook.display()),
        ));
    }
    Ok(())
}

fn handle_sheets(args: WorkbookArgs) -> Result<(), AppError> {
    let loaded = open_workbook(&args)?;
    println!("{}", loaded.path.display());
    print!("{}", crate::report::format_sheet_list(&loaded.workbook));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let loaded = open_workbook(&args.workbook)?;
    let sheet = {
        let names = loaded.sheet_names();
        match &args.sheet {
            Some(input) => resolve_sheet(&names, input)?,
            None => prompt_for_sheet(&names)?,
        }
    };

    let items = (!args.items.is_empty()).then(|| args.items.clone());
    let mut state = DashboardState::Loaded(loaded).select(sheet, items);
    if args.all_items {
        let all = state.view().map(|v| v.frame.unique_items()).unwrap_or_default();
        state = state.set_items(all);
    }
    let state = state.render();

    let Some(view) = state.view() else {
        return Err(AppError::new(ErrorKind::Config, format!("Sheet #{} is not available.", sheet + 1)));
    };

    println!("{}", crate::report::format_selection(view));
    let known = view.frame.unique_items();
    let unknown: Vec<&str> = args
        .items
        .iter()
        .filter(|item| view.frame.item_col.is_some() && !known.contains(*item))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        println!("Unknown item(s): {} (available: {})", unknown.join(", "), known.join(", "));
    }

    match state.outcome() {
        Some(RenderOutcome::Chart(chart)) => {
            println!("{}", crate::plot::render_ascii_chart(chart, args.width, args.height));
        }
        Some(RenderOutcome::NoData) => println!("No data to plot for the current selection."),
        Some(RenderOutcome::MissingColumns) => {
            println!("This sheet has no date/value column to plot.");
        }
        None => {}
    }

    println!("{}", crate::report::format_null_summary(&view.null_summary()));

    if args.raw {
        println!();
        print!(
            "{}",
            crate::report::format_raw_rows(&view.frame.columns, &view.raw_rows(RAW_PREVIEW_ROWS), RAW_CELL_WIDTH)
        );
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let loaded = open_workbook(&args.workbook)?;
    let names = loaded.sheet_names();
    let idx = resolve_sheet(&names, &args.sheet)?;

    let sheet = &loaded.workbook.sheets()[idx];
    let rows = crate::io::export::write_sheet_csv(&args.out, &sheet.table)?;
    println!("Wrote {rows} row(s) of '{}' to {}", sheet.name, args.out.display());
    Ok(())
}

/// Env/.env settings with the `--workbook` flag applied on top.
fn settings_for(args: &WorkbookArgs) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(path) = &args.workbook {
        settings.workbook = path.clone();
    }
    debug!("workbook path: {}", settings.workbook.display());
    settings
}

fn workbook_path(args: &WorkbookArgs) -> PathBuf {
    settings_for(args).workbook
}

fn open_workbook(args: &WorkbookArgs) -> Result<LoadedWorkbook, AppError> {
    let path = workbook_path(args);
    let workbook = read_workbook(&path).map_err(|e| match e.kind() {
        ErrorKind::MissingArtifact => AppError::new(
            ErrorKind::MissingArtifact,
            format!("{} Run `econ fetch` first.", e.message()),
        ),
        _ => e,
    })?;
    Ok(LoadedWorkbook { path, workbook })
}

/// Built-in or JSON catalog, filtered by `--provider` when given.
pub fn catalog_for(args: &SourceArgs) -> Result<Vec<SeriesSpec>, AppError> {
    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => default_catalog(),
    };
    let catalog: Vec<SeriesSpec> = if args.providers.is_empty() {
        catalog
    } else {
        catalog
            .into_iter()
            .filter(|spec| args.providers.contains(&spec.provider))
            .collect()
    };

    if catalog.is_empty() {
        return Err(AppError::new(
            ErrorKind::Config,
            "The series catalog is empty (check --catalog / --provider).",
        ));
    }
    Ok(catalog)
}

/// Rewrite argv so `econ` defaults to `econ dashboard`.
///
/// Rules:
/// - `econ`                        -> `econ dashboard`
/// - `econ -w data.xlsx ...`       -> `econ dashboard -w data.xlsx ...`
/// - `econ --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dashboard".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "dashboard" | "fetch" | "sheets" | "show" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "dashboard flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dashboard".to_string());
        return argv;
    }

    // Otherwise, leave as-is (clap reports the unknown subcommand).
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_dashboard() {
        assert_eq!(rewrite_args(args(&["econ"])), args(&["econ", "dashboard"]));
    }

    #[test]
    fn leading_flag_goes_to_dashboard() {
        assert_eq!(
            rewrite_args(args(&["econ", "-w", "x.xlsx"])),
            args(&["econ", "dashboard", "-w", "x.xlsx"])
        );
    }

    #[test]
    fn help_and_subcommands_untouched() {
        assert_eq!(rewrite_args(args(&["econ", "--help"])), args(&["econ", "--help"]));
        assert_eq!(
            rewrite_args(args(&["econ", "show", "--raw"])),
            args(&["econ", "show", "--raw"])
        );
        assert_eq!(rewrite_args(args(&["econ", "bogus"])), args(&["econ", "bogus"]));
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = Cli::parse_from(rewrite_args(args(&["econ", "--lookback-years", "5"])));
        let Command::Dashboard(d) = cli.command else {
            panic!("expected dashboard");
        };
        assert_eq!(d.source.lookback_years, 5);
    }

    #[test]
    fn provider_filter_narrows_catalog() {
        let source = SourceArgs {
            catalog: None,
            lookback_years: 3,
            providers: vec![Provider::IndexPortal],
        };
        let catalog = catalog_for(&source).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|s| s.provider == Provider::IndexPortal));
    }

    #[test]
    fn missing_catalog_file_is_config_error() {
        let source = SourceArgs {
            catalog: Some(PathBuf::from("/definitely/not/here.json")),
            lookback_years: 3,
            providers: Vec::new(),
        };
        assert_eq!(catalog_for(&source).unwrap_err().kind(), ErrorKind::Config);
    }
}
