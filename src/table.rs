//! Uniform tabular shape for one fetched series.
//!
//! Provider adapters declare which JSON key feeds which column; this module only
//! renames and selects. No aggregation or derived values.

use serde_json::Value;

/// Column names written to the workbook (and detected again by the dashboard).
pub mod columns {
    pub const ITEM_NAME: &str = "항목명";
    pub const ITEM_LABEL: &str = "항목이름";
    pub const ITEM: &str = "항목";
    pub const CATEGORY: &str = "지수종류";
    pub const STAT_NAME: &str = "통계명";
    pub const UNIT: &str = "단위";
    pub const PERIOD: &str = "시점";
    pub const DATE: &str = "날짜";
    pub const INDICATOR_VALUE: &str = "지표값";
    pub const VALUE: &str = "값";
}

/// Maps one JSON record key to one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub column: &'static str,
    pub key: &'static str,
}

impl ColumnMap {
    pub const fn new(column: &'static str, key: &'static str) -> Self {
        Self { column, key }
    }
}

/// Rows of string cells under a fixed header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeriesTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SeriesTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Map raw provider records into a table with the given column layout.
pub fn normalize_records(layout: &[ColumnMap], records: &[Value]) -> SeriesTable {
    let mut table = SeriesTable::new(layout.iter().map(|m| m.column.to_string()).collect());
    for record in records {
        table
            .rows
            .push(layout.iter().map(|m| field_text(record, m.key)).collect());
    }
    table
}

/// Textual value of `record[key]`; anything missing or null becomes `""`.
pub fn field_text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LAYOUT: &[ColumnMap] = &[
        ColumnMap::new(columns::ITEM_NAME, "ITEM_NAME1"),
        ColumnMap::new(columns::PERIOD, "TIME"),
        ColumnMap::new(columns::INDICATOR_VALUE, "DATA_VALUE"),
    ];

    #[test]
    fn missing_fields_become_empty_strings() {
        let records = vec![
            json!({"ITEM_NAME1": "총지수", "TIME": "202401", "DATA_VALUE": "113.15"}),
            json!({"ITEM_NAME1": "총지수", "TIME": "202402"}),
            json!({"TIME": "202403", "DATA_VALUE": null}),
        ];
        let table = normalize_records(LAYOUT, &records);
        assert_eq!(table.columns, vec!["항목명", "시점", "지표값"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, columns::INDICATOR_VALUE), Some("113.15"));
        assert_eq!(table.cell(1, columns::INDICATOR_VALUE), Some(""));
        assert_eq!(table.cell(2, columns::ITEM_NAME), Some(""));
    }

    #[test]
    fn numeric_fields_keep_their_text() {
        let record = json!({"DT": 1234.5, "N": 7, "B": true});
        assert_eq!(field_text(&record, "DT"), "1234.5");
        assert_eq!(field_text(&record, "N"), "7");
        assert_eq!(field_text(&record, "B"), "true");
    }

    #[test]
    fn extra_record_keys_are_ignored() {
        let records = vec![json!({"TIME": "2024Q1", "STAT_CODE": "200Y106", "UNIT_NAME": "%"})];
        let table = normalize_records(LAYOUT, &records);
        assert_eq!(table.rows[0], vec!["", "2024Q1", ""]);
    }
}
