//! Multi-sheet workbook: one sheet per fetched series.
//!
//! The `.xlsx` file is the only hand-off between the fetch pipeline and the
//! dashboard. It is always rewritten in full; there is no incremental update.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use log::info;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use crate::error::{AppError, ErrorKind};
use crate::table::SeriesTable;

/// Hard limit of the spreadsheet format.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = [':', '\\', '/', '*', '?', '[', ']'];

/// Make a title usable as a sheet name.
///
/// Strips `: \ / * ? [ ]` and truncates to 31 characters. The format also rejects
/// blank names and names wrapped in apostrophes, so those are fixed up as well.
/// Applying this twice gives the same result as applying it once.
pub fn sanitize_sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN_SHEET_CHARS.contains(c))
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub table: SeriesTable,
}

/// Ordered mapping of sanitized sheet name -> table.
///
/// Names are compared case-insensitively, as spreadsheet applications do. A later
/// insert under a colliding name replaces the earlier table in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the sanitized title; returns the table it replaced, if any.
    pub fn insert(&mut self, title: &str, table: SeriesTable) -> Option<SeriesTable> {
        let name = sanitize_sheet_name(title);
        match self.position(&name) {
            Some(idx) => {
                let old = std::mem::replace(&mut self.sheets[idx], Sheet { name, table });
                Some(old.table)
            }
            None => {
                self.sheets.push(Sheet { name, table });
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|idx| &self.sheets[idx])
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.sheets.iter().position(|s| s.name.to_lowercase() == key)
    }
}

/// Result of a write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { sheets: usize },
    /// Nothing was fetched; no file was created.
    NothingToPersist,
}

/// Write every sheet to `path` (header row in bold, cells as text).
pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<WriteOutcome, AppError> {
    if workbook.is_empty() {
        return Ok(WriteOutcome::NothingToPersist);
    }

    let mut xlsx = XlsxWorkbook::new();
    let header = Format::new().set_bold();

    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| persistence(format!("Invalid sheet name '{}': {e}", sheet.name)))?;

        for (col, name) in sheet.table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, name, &header)
                .map_err(|e| persistence(format!("Failed to write header of '{}': {e}", sheet.name)))?;
        }

        for (row_idx, row) in sheet.table.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(row_idx as u32 + 1, col as u16, cell)
                    .map_err(|e| persistence(format!("Failed to write row of '{}': {e}", sheet.name)))?;
            }
        }
        info!("wrote sheet '{}' ({} rows)", sheet.name, sheet.table.len());
    }

    xlsx.save(path)
        .map_err(|e| persistence(format!("Failed to save workbook '{}': {e}", path.display())))?;

    Ok(WriteOutcome::Written {
        sheets: workbook.len(),
    })
}

/// Read every sheet back; the first row of each sheet is the header.
pub fn read_workbook(path: &Path) -> Result<Workbook, AppError> {
    if !path.is_file() {
        return Err(AppError::new(
            ErrorKind::MissingArtifact,
            format!("Workbook not found: {}", path.display()),
        ));
    }

    let mut xlsx: Xlsx<_> = open_workbook(path)
        .map_err(|e| persistence(format!("Failed to open workbook '{}': {e}", path.display())))?;

    let mut workbook = Workbook::new();
    for name in xlsx.sheet_names() {
        let range = xlsx
            .worksheet_range(&name)
            .map_err(|e| persistence(format!("Failed to read sheet '{name}': {e}")))?;

        let mut rows = range.rows();
        let columns: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|c| cell_text(c).trim().to_string()).collect())
            .unwrap_or_default();

        let mut table = SeriesTable::new(columns);
        for row in rows {
            table.rows.push(row.iter().map(cell_text).collect());
        }
        workbook.insert(&name, table);
    }

    Ok(workbook)
}

/// Delete the artifact; a file that is already gone is not an error.
pub fn remove_workbook(path: &Path) -> Result<(), AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
        Err(e) => Err(persistence(format!(
            "Failed to delete workbook '{}': {e}",
            path.display()
        ))),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Spreadsheet tools often store `202403` as a float.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

fn persistence(message: String) -> AppError {
    AppError::new(ErrorKind::Persistence, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table(rows: &[[&str; 3]]) -> SeriesTable {
        SeriesTable {
            columns: vec!["항목명".into(), "시점".into(), "지표값".into()],
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn sanitize_strips_forbidden_and_truncates() {
        assert_eq!(sanitize_sheet_name("[ECOS] 환율(달러)"), "ECOS 환율(달러)");
        assert_eq!(sanitize_sheet_name("a:b\\c/d*e?f[g]h"), "abcdefgh");

        let long = "[ECOS] 기업경기실사지수(실적)_비제조업 and a long suffix";
        let name = sanitize_sheet_name(long);
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_CHARS);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = vec![
            "[KOSIS] 광업제조업동향".to_string(),
            "'quoted'".to_string(),
            "[]".to_string(),
            format!("{}?", "x".repeat(40)),
            "  ".to_string(),
            "ab'[]'".to_string(),
        ];
        for input in inputs {
            let once = sanitize_sheet_name(&input);
            let twice = sanitize_sheet_name(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
            assert!(once.chars().count() <= MAX_SHEET_NAME_CHARS);
            assert!(!once.chars().any(|c| FORBIDDEN_SHEET_CHARS.contains(&c)));
            assert!(!once.is_empty());
        }
    }

    #[test]
    fn colliding_names_overwrite_in_place() {
        let mut wb = Workbook::new();
        wb.insert("[ECOS] A", table(&[["x", "202401", "1"]]));
        wb.insert("[ECOS] B", table(&[["y", "202401", "2"]]));
        let replaced = wb.insert("ECOS a", table(&[["z", "202401", "3"]]));

        assert!(replaced.is_some());
        assert_eq!(wb.sheet_names(), vec!["ECOS a", "ECOS B"]);
        assert_eq!(wb.get("ecos a").unwrap().table.rows[0][0], "z");
    }

    #[test]
    fn empty_workbook_is_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let outcome = write_workbook(&path, &Workbook::new()).unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToPersist);
        assert!(!path.exists());
    }

    #[test]
    fn write_then_read_keeps_sheets_and_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut wb = Workbook::new();
        wb.insert("[ECOS] 소비자물가지수", table(&[["총지수", "202401", "113.15"], ["총지수", "202402", ""]]));
        wb.insert("[지표누리] 시장금리", table(&[["국고채(3년)", "2024.01", "1,234.5"]]));

        let outcome = write_workbook(&path, &wb).unwrap();
        assert_eq!(outcome, WriteOutcome::Written { sheets: 2 });

        let back = read_workbook(&path).unwrap();
        assert_eq!(back.sheet_names(), vec!["ECOS 소비자물가지수", "지표누리 시장금리"]);

        let cpi = &back.get("ECOS 소비자물가지수").unwrap().table;
        assert_eq!(cpi.columns, vec!["항목명", "시점", "지표값"]);
        assert_eq!(cpi.cell(0, "지표값"), Some("113.15"));
        assert_eq!(cpi.cell(1, "지표값"), Some(""));
        assert_eq!(back.get("지표누리 시장금리").unwrap().table.cell(0, "지표값"), Some("1,234.5"));
    }

    #[test]
    fn reading_a_missing_file_is_missing_artifact() {
        let dir = tempdir().unwrap();
        let err = read_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArtifact);
    }

    #[test]
    fn remove_tolerates_absent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.xlsx");
        remove_workbook(&path).unwrap();
        std::fs::write(&path, b"x").unwrap();
        remove_workbook(&path).unwrap();
        assert!(!path.exists());
    }
}
