//! Formatted terminal output for the batch commands.
//!
//! We keep formatting code in one place so:
//! - the fetch/dashboard code stays free of `println!`
//! - output changes are localized (and covered by the tests below)

use crate::app::pipeline::RunOutput;
use crate::dashboard::{NullSummary, SheetView};
use crate::io::workbook::{Workbook, WriteOutcome};

/// Summary of a fetch run: window, saved sheets, skipped series.
pub fn format_fetch_report(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== econ - macro indicator fetch ===\n");
    out.push_str(&format!(
        "Window: months {}..{} | quarters {}..{}\n",
        run.window.start_month, run.window.end_month, run.window.start_quarter, run.window.end_quarter
    ));
    out.push_str(&format!(
        "Series: requested={} fetched={} skipped={}\n",
        run.requested,
        run.requested - run.skipped.len(),
        run.skipped.len()
    ));

    match run.outcome {
        WriteOutcome::Written { sheets } => {
            out.push_str(&format!("Saved {sheets} sheet(s) to {}\n", run.path.display()));
        }
        WriteOutcome::NothingToPersist => {
            out.push_str(&format!("Nothing fetched; {} was not written.\n", run.path.display()));
        }
    }

    if !run.sheets.is_empty() {
        out.push_str("\nSheets:\n");
        for (idx, name) in run.sheets.iter().enumerate() {
            out.push_str(&format!("{:>3}) {name}\n", idx + 1));
        }
    }

    if !run.overwritten.is_empty() {
        out.push_str("\nReplaced by a later series with the same sheet name:\n");
        for title in &run.overwritten {
            out.push_str(&format!("  - {title}\n"));
        }
    }

    if !run.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for s in &run.skipped {
            out.push_str(&format!(
                "  - {:<28} [{}] {}\n",
                truncate(&s.title, 28),
                s.error.kind().label(),
                s.error.message()
            ));
        }
    }

    out
}

/// Numbered sheet list with row counts.
pub fn format_sheet_list(workbook: &Workbook) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>3}  {:<31} {:>6}\n", "#", "sheet", "rows"));
    out.push_str(&format!("{:->3}  {:-<31} {:->6}\n", "", "", ""));
    for (idx, sheet) in workbook.sheets().iter().enumerate() {
        out.push_str(&format!("{:>3}  {:<31} {:>6}\n", idx + 1, sheet.name, sheet.table.len()));
    }
    out
}

/// One-line description of the current selection.
pub fn format_selection(view: &SheetView) -> String {
    if view.frame.item_col.is_none() {
        return format!("Sheet: {} (no item column)", view.name);
    }
    if view.selected_items.is_empty() {
        return format!("Sheet: {} | items: (none)", view.name);
    }
    format!("Sheet: {} | items: {}", view.name, view.selected_items.join(", "))
}

pub fn format_null_summary(summary: &NullSummary) -> String {
    format!(
        "Rows: {} | missing dates: {} | missing values: {}",
        summary.rows, summary.missing_dates, summary.missing_values
    )
}

/// Raw rows as a fixed-width table (cells truncated to `width` chars).
pub fn format_raw_rows(columns: &[String], rows: &[&[String]], width: usize) -> String {
    let width = width.max(4);
    let mut out = String::new();

    let header: Vec<String> = columns.iter().map(|c| pad(&truncate(c, width), width)).collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    let rule: Vec<String> = columns.iter().map(|_| "-".repeat(width)).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = (0..columns.len())
            .map(|i| pad(&truncate(row.get(i).map(String::as_str).unwrap_or(""), width), width))
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::period::PeriodWindow;
    use crate::providers::SkippedSeries;
    use crate::table::SeriesTable;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[test]
    fn fetch_report_lists_sheets_and_skips() {
        let run = RunOutput {
            path: PathBuf::from("out.xlsx"),
            window: PeriodWindow::rolling(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(), 3),
            requested: 3,
            sheets: vec!["ECOS 실질GDP".to_string()],
            skipped: vec![SkippedSeries {
                title: "생활물가지수".to_string(),
                error: AppError::new(ErrorKind::EmptyResponse, "no rows"),
            }],
            overwritten: Vec::new(),
            outcome: WriteOutcome::Written { sheets: 1 },
        };

        let txt = format_fetch_report(&run);
        assert!(txt.contains("Window: months 202205..202505 | quarters 2022Q2..2025Q2"));
        assert!(txt.contains("requested=3 fetched=2 skipped=1"));
        assert!(txt.contains("Saved 1 sheet(s) to out.xlsx"));
        assert!(txt.contains("  1) ECOS 실질GDP"));
        assert!(txt.contains("no rows"));
    }

    #[test]
    fn fetch_report_nothing_to_persist() {
        let run = RunOutput {
            path: PathBuf::from("out.xlsx"),
            window: PeriodWindow::rolling(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(), 3),
            requested: 0,
            sheets: Vec::new(),
            skipped: Vec::new(),
            overwritten: Vec::new(),
            outcome: WriteOutcome::NothingToPersist,
        };
        let txt = format_fetch_report(&run);
        assert!(txt.contains("Nothing fetched; out.xlsx was not written."));
        assert!(!txt.contains("Sheets:"));
    }

    #[test]
    fn sheet_list_has_row_counts() {
        let mut wb = Workbook::new();
        let mut table = SeriesTable::new(vec!["시점".into(), "값".into()]);
        table.rows.push(vec!["202401".into(), "1".into()]);
        wb.insert("[KOSIS] 산업", table);

        let txt = format_sheet_list(&wb);
        let last = txt.lines().last().unwrap();
        assert!(last.starts_with("  1  KOSIS 산업"));
        assert!(last.ends_with("     1"));
    }

    #[test]
    fn raw_rows_golden() {
        let columns = vec!["시점".to_string(), "지표값".to_string()];
        let r1 = vec!["202401".to_string(), "113.15".to_string()];
        let r2 = vec!["202402".to_string()];
        let rows: Vec<&[String]> = vec![&r1, &r2];

        let txt = format_raw_rows(&columns, &rows, 6);
        let expected = concat!(
            "시점     지표값\n",
            "------ ------\n",
            "202401 113.15\n",
            "202402\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
