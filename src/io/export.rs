//! Export one workbook sheet to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::error::{AppError, ErrorKind};
use crate::table::SeriesTable;

/// Write the sheet's header and rows verbatim (raw strings, no parsing).
pub fn write_sheet_csv(path: &Path, table: &SeriesTable) -> Result<usize, AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            ErrorKind::Persistence,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writer
        .write_record(&table.columns)
        .map_err(|e| AppError::new(ErrorKind::Persistence, format!("Failed to write export CSV header: {e}")))?;

    let width = table.columns.len();
    for row in &table.rows {
        // Sheets read back from xlsx can be ragged; pad to the header width.
        let mut record: Vec<&str> = row.iter().map(String::as_str).take(width).collect();
        record.resize(width, "");
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(ErrorKind::Persistence, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(ErrorKind::Persistence, format!("Failed to flush export CSV: {e}")))?;

    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_padded_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let table = SeriesTable {
            columns: vec!["시점".into(), "값".into(), "단위".into()],
            rows: vec![
                vec!["2024.01".into(), "1,234.5".into(), "%".into()],
                vec!["2024.02".into()],
            ],
        };

        let n = write_sheet_csv(&path, &table).unwrap();
        assert_eq!(n, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "시점,값,단위\n2024.01,\"1,234.5\",%\n2024.02,,\n");
    }
}
