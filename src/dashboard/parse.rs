//! Lenient parsing of period and value cells read back from the workbook.
//!
//! Providers disagree on period encodings (`2024Q2`, `202403`, `2024.03`, ...)
//! and write values as text with thousands separators. Anything that fails here
//! is excluded from the chart but stays visible in the raw view.

use chrono::NaiveDate;

/// Period cell -> first day of the period.
///
/// A `<year>Q<1-4>` marker maps to the first month of that quarter; otherwise
/// `YYYYMM`, `YYYY-MM`, `YYYY.MM`, `YYYY/MM`, `YYYY` are tried in that order.
pub fn parse_period_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.contains('Q') {
        return parse_quarter(s);
    }

    parse_compact_month(s)
        .or_else(|| parse_separated_month(s, '-'))
        .or_else(|| parse_separated_month(s, '.'))
        .or_else(|| parse_separated_month(s, '/'))
        .or_else(|| parse_year(s))
}

fn parse_quarter(s: &str) -> Option<NaiveDate> {
    let (year, quarter) = s.split_once('Q')?;
    let year = parse_year_digits(year)?;
    let month = match quarter {
        "1" => 1,
        "2" => 4,
        "3" => 7,
        "4" => 10,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_compact_month(s: &str) -> Option<NaiveDate> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = parse_year_digits(&s[..4])?;
    let month = s[4..].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_separated_month(s: &str, sep: char) -> Option<NaiveDate> {
    let (year, month) = s.split_once(sep)?;
    let year = parse_year_digits(year)?;
    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = month.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_year(s: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(parse_year_digits(s)?, 1, 1)
}

fn parse_year_digits(s: &str) -> Option<i32> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Result of numeric coercion of one value cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedValue {
    Number(f64),
    /// Empty after cleanup.
    Missing,
    /// Non-empty but not a number (e.g. `-`, `x`).
    Invalid,
}

impl ParsedValue {
    pub fn number(self) -> Option<f64> {
        match self {
            ParsedValue::Number(v) => Some(v),
            ParsedValue::Missing | ParsedValue::Invalid => None,
        }
    }
}

/// Strip thousands separators and whitespace, then parse as `f64`.
pub fn parse_value(raw: &str) -> ParsedValue {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return ParsedValue::Missing;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => ParsedValue::Number(v),
        _ => ParsedValue::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, 1)
    }

    #[test]
    fn quarter_markers_map_to_quarter_start() {
        assert_eq!(parse_period_date("2024Q1"), d(2024, 1));
        assert_eq!(parse_period_date("2024Q2"), d(2024, 4));
        assert_eq!(parse_period_date(" 2024Q3 "), d(2024, 7));
        assert_eq!(parse_period_date("2024Q4"), d(2024, 10));
        assert_eq!(parse_period_date("2024Q5"), None);
        assert_eq!(parse_period_date("Q2"), None);
    }

    #[test]
    fn month_patterns() {
        assert_eq!(parse_period_date("202403"), d(2024, 3));
        assert_eq!(parse_period_date("2024-03"), d(2024, 3));
        assert_eq!(parse_period_date("2024.03"), d(2024, 3));
        assert_eq!(parse_period_date("2024/3"), d(2024, 3));
        assert_eq!(parse_period_date("2024"), d(2024, 1));
    }

    #[test]
    fn unparseable_periods() {
        assert_eq!(parse_period_date(""), None);
        assert_eq!(parse_period_date("202413"), None);
        assert_eq!(parse_period_date("2024-03-15"), None);
        assert_eq!(parse_period_date("24.03"), None);
        assert_eq!(parse_period_date("2024년 3월"), None);
    }

    #[test]
    fn value_coercion() {
        assert_eq!(parse_value("1,234.5"), ParsedValue::Number(1234.5));
        assert_eq!(parse_value(" 3.28 "), ParsedValue::Number(3.28));
        assert_eq!(parse_value("-0.4"), ParsedValue::Number(-0.4));
        assert_eq!(parse_value(""), ParsedValue::Missing);
        assert_eq!(parse_value("  "), ParsedValue::Missing);
        assert_eq!(parse_value("-"), ParsedValue::Invalid);
        assert_eq!(parse_value("n/a"), ParsedValue::Invalid);
        assert_eq!(parse_value("inf"), ParsedValue::Invalid);
        assert_eq!(parse_value("1,234.5").number(), Some(1234.5));
        assert_eq!(parse_value("").number(), None);
    }
}
