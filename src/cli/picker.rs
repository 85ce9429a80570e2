//! Sheet selection for the non-interactive commands.
//!
//! - `--sheet` accepts a sheet name or a 1-based index
//! - without `--sheet`, the user is prompted with the numbered sheet list

use std::io::{self, BufRead, Write};

use crate::error::{AppError, ErrorKind};
use crate::io::workbook::sanitize_sheet_name;

/// Resolve a name or 1-based index to a sheet position.
///
/// Names match exactly, then case-insensitively, then after sanitizing (so the
/// original series title, e.g. `[ECOS] 실질GDP`, also works).
pub fn resolve_sheet(names: &[&str], input: &str) -> Result<usize, AppError> {
    let input = input.trim();
    if let Ok(choice) = input.parse::<usize>() {
        if (1..=names.len()).contains(&choice) {
            return Ok(choice - 1);
        }
        return Err(AppError::new(
            ErrorKind::Config,
            format!("Invalid sheet number: {choice}. Enter a number between 1 and {}.", names.len()),
        ));
    }

    let lower = input.to_lowercase();
    let sanitized = sanitize_sheet_name(input).to_lowercase();
    names
        .iter()
        .position(|n| *n == input)
        .or_else(|| names.iter().position(|n| n.to_lowercase() == lower))
        .or_else(|| names.iter().position(|n| n.to_lowercase() == sanitized))
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::Config,
                format!("No sheet named '{input}'. Use `econ sheets` to list them."),
            )
        })
}

/// Prompt the user to pick a sheet from stdin.
///
/// Behavior:
/// - list the sheets
/// - accept either a number (from the list) or a sheet name
/// - `q` cancels
pub fn prompt_for_sheet(names: &[&str]) -> Result<usize, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_with(names, &mut input, &mut output)
}

fn prompt_with<R: BufRead, W: Write>(names: &[&str], input: &mut R, out: &mut W) -> Result<usize, AppError> {
    if names.is_empty() {
        return Err(AppError::new(ErrorKind::MissingArtifact, "The workbook has no sheets."));
    }

    let io_err = |e: io::Error| AppError::new(ErrorKind::Config, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} sheet(s):", names.len()).map_err(io_err)?;
    for (idx, name) in names.iter().enumerate() {
        writeln!(out, "{:>3}) {name}", idx + 1).map_err(io_err)?;
    }

    loop {
        write!(out, "Select a sheet by number (1-{}) or name (q to quit): ", names.len()).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                ErrorKind::Config,
                "No input received. Pass the sheet with `econ show --sheet <name|N>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(ErrorKind::Config, "Canceled."));
        }

        match resolve_sheet(names, line) {
            Ok(idx) => return Ok(idx),
            Err(err) => {
                writeln!(out, "{err}").map_err(io_err)?;
                continue;
            }
        }
    }
}
