//! Chart-ready view of one sheet.
//!
//! A [`ChartFrame`] keeps every raw row and adds the parsed date, parsed value,
//! and item label next to it. Filtering and series building work on row indices
//! so the raw view and the chart always describe the same rows.

use chrono::{Datelike, NaiveDate};

use crate::dashboard::parse::{ParsedValue, parse_period_date, parse_value};
use crate::table::{SeriesTable, columns};

/// Candidate columns, highest priority first.
pub const DATE_COLUMNS: [&str; 2] = [columns::PERIOD, columns::DATE];
pub const VALUE_COLUMNS: [&str; 2] = [columns::INDICATOR_VALUE, columns::VALUE];
pub const ITEM_COLUMNS: [&str; 4] = [
    columns::ITEM_NAME,
    columns::CATEGORY,
    columns::ITEM,
    columns::ITEM_LABEL,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub raw: Vec<String>,
    pub date: Option<NaiveDate>,
    pub value: ParsedValue,
    /// `None` when the sheet has no item column or the cell is blank.
    pub item: Option<String>,
}

impl ChartRow {
    pub fn point(&self) -> Option<(NaiveDate, f64)> {
        Some((self.date?, self.value.number()?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub columns: Vec<String>,
    pub date_col: Option<usize>,
    pub value_col: Option<usize>,
    pub item_col: Option<usize>,
    pub rows: Vec<ChartRow>,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    /// Sorted by date.
    pub points: Vec<(NaiveDate, f64)>,
}

/// Counts of unparsed cells within a row selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullSummary {
    pub rows: usize,
    pub missing_dates: usize,
    pub missing_values: usize,
}

impl ChartFrame {
    pub fn from_table(table: &SeriesTable) -> Self {
        let columns: Vec<String> = table.columns.iter().map(|c| c.trim().to_string()).collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|name| columns.iter().position(|c| c == name))
        };
        let date_col = find(&DATE_COLUMNS);
        let value_col = find(&VALUE_COLUMNS);
        let item_col = find(&ITEM_COLUMNS);

        let cell = |row: &[String], col: Option<usize>| -> Option<String> {
            col.and_then(|c| row.get(c)).cloned()
        };

        let rows = table
            .rows
            .iter()
            .map(|raw| {
                let date = cell(raw, date_col).and_then(|s| parse_period_date(&s));
                let value = cell(raw, value_col)
                    .map(|s| parse_value(&s))
                    .unwrap_or(ParsedValue::Missing);
                let item = cell(raw, item_col)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                ChartRow {
                    raw: raw.clone(),
                    date,
                    value,
                    item,
                }
            })
            .collect();

        Self {
            columns,
            date_col,
            value_col,
            item_col,
            rows,
        }
    }

    /// Date and value columns are both needed to draw anything.
    pub fn has_required_columns(&self) -> bool {
        self.date_col.is_some() && self.value_col.is_some()
    }

    pub fn column_name(&self, idx: Option<usize>) -> Option<&str> {
        idx.and_then(|i| self.columns.get(i)).map(String::as_str)
    }

    /// Distinct item labels in order of first appearance.
    pub fn unique_items(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(item) = &row.item {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
        }
        out
    }

    /// The first item only (empty when there is no item column).
    pub fn default_selection(&self) -> Vec<String> {
        self.unique_items().into_iter().take(1).collect()
    }

    /// Indices of rows matching the selected items.
    ///
    /// Without an item column every row passes; with one, an empty selection
    /// passes nothing.
    pub fn filter(&self, selected: &[String]) -> Vec<usize> {
        if self.item_col.is_none() {
            return (0..self.rows.len()).collect();
        }
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.item.as_ref().is_some_and(|item| selected.contains(item)))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// One line per distinct item among `rows` (a single line without an item column).
    pub fn series(&self, rows: &[usize]) -> Vec<ChartSeries> {
        let fallback = self
            .column_name(self.value_col)
            .unwrap_or(columns::VALUE)
            .to_string();

        let mut out: Vec<ChartSeries> = Vec::new();
        for &idx in rows {
            let Some(row) = self.rows.get(idx) else {
                continue;
            };
            let Some(point) = row.point() else {
                continue;
            };
            let label = row.item.clone().unwrap_or_else(|| fallback.clone());
            match out.iter_mut().find(|s| s.label == label) {
                Some(series) => series.points.push(point),
                None => out.push(ChartSeries {
                    label,
                    points: vec![point],
                }),
            }
        }

        for series in &mut out {
            series.points.sort_by_key(|(date, _)| *date);
        }
        out
    }

    pub fn null_summary(&self, rows: &[usize]) -> NullSummary {
        let mut summary = NullSummary::default();
        for row in rows.iter().filter_map(|&idx| self.rows.get(idx)) {
            summary.rows += 1;
            if row.date.is_none() {
                summary.missing_dates += 1;
            }
            if row.value.number().is_none() {
                summary.missing_values += 1;
            }
        }
        summary
    }
}

/// Plot coordinates: x is days since 0001-01-01 so dates stay linear.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> SeriesTable {
        SeriesTable {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn kosis() -> SeriesTable {
        table(
            &["통계명", "지수종류", "항목", "날짜", "단위", "값"],
            &[
                &["광업제조업동향", "광공업", "원지수", "202502", "2020=100", "112.0"],
                &["광업제조업동향", "광공업", "원지수", "202501", "2020=100", "110.2"],
                &["광업제조업동향", "제조업", "원지수", "202501", "2020=100", "111.9"],
                &["광업제조업동향", "제조업", "원지수", "bad", "2020=100", "1"],
                &["광업제조업동향", "", "원지수", "202501", "2020=100", "5"],
            ],
        )
    }

    #[test]
    fn detects_columns_by_priority() {
        let frame = ChartFrame::from_table(&kosis());
        assert_eq!(frame.column_name(frame.date_col), Some("날짜"));
        assert_eq!(frame.column_name(frame.value_col), Some("값"));
        // 지수종류 outranks 항목.
        assert_eq!(frame.column_name(frame.item_col), Some("지수종류"));
    }

    #[test]
    fn header_whitespace_is_ignored() {
        let frame = ChartFrame::from_table(&table(&[" 시점 ", "지표값"], &[&["2024Q1", "1"]]));
        assert!(frame.has_required_columns());
        assert_eq!(frame.item_col, None);
    }

    #[test]
    fn unique_items_in_appearance_order_without_blanks() {
        let frame = ChartFrame::from_table(&kosis());
        assert_eq!(frame.unique_items(), vec!["광공업", "제조업"]);
        assert_eq!(frame.default_selection(), vec!["광공업"]);
    }

    #[test]
    fn empty_selection_filters_everything_out() {
        let frame = ChartFrame::from_table(&kosis());
        assert!(frame.filter(&[]).is_empty());
        assert_eq!(frame.filter(&["제조업".to_string()]), vec![2, 3]);
    }

    #[test]
    fn no_item_column_passes_all_rows() {
        let frame = ChartFrame::from_table(&table(&["시점", "지표값"], &[&["2024Q1", "1"], &["2024Q2", "2"]]));
        assert_eq!(frame.filter(&[]), vec![0, 1]);
        let series = frame.series(&[0, 1]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "지표값");
    }

    #[test]
    fn series_group_by_item_and_sort_by_date() {
        let frame = ChartFrame::from_table(&kosis());
        let rows = frame.filter(&["광공업".to_string(), "제조업".to_string()]);
        let series = frame.series(&rows);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "광공업");
        let dates: Vec<_> = series[0].points.iter().map(|(d, _)| d.month()).collect();
        assert_eq!(dates, vec![1, 2]);
        // The unparseable "bad" date is left out of the line.
        assert_eq!(series[1].points.len(), 1);
    }

    #[test]
    fn null_summary_counts_unparsed_cells() {
        let t = table(
            &["항목명", "시점", "지표값"],
            &[&["a", "202401", ""], &["a", "x", "1"], &["a", "202403", "1,234.5"]],
        );
        let frame = ChartFrame::from_table(&t);
        let rows = frame.filter(&["a".to_string()]);
        let summary = frame.null_summary(&rows);
        assert_eq!(
            summary,
            NullSummary {
                rows: 3,
                missing_dates: 1,
                missing_values: 1
            }
        );
    }

    #[test]
    fn x_axis_round_trips_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
    }
}
