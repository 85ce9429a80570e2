//! Rolling period labels used to parameterize provider requests.
//!
//! Labels follow the providers' own conventions:
//! - month: `YYYYMM`
//! - quarter: `YYYYQn` (n = 1..=4)
//! - year: `YYYY`

use chrono::{Datelike, Months, NaiveDate};

/// Default lookback window, in years.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 3;

/// Quarter ordinal (1..=4) of a date.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// `YYYYQn` label for the quarter containing `date`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), quarter_of(date))
}

/// `YYYYMM` label for the month containing `date`.
pub fn month_label(date: NaiveDate) -> String {
    format!("{}{:02}", date.year(), date.month())
}

/// `YYYY` label.
pub fn year_label(date: NaiveDate) -> String {
    format!("{}", date.year())
}

/// Start/end labels for a lookback window ending at `today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start_month: String,
    pub end_month: String,
    pub start_quarter: String,
    pub end_quarter: String,
    pub start_year: String,
    pub end_year: String,
}

impl PeriodWindow {
    pub fn rolling(today: NaiveDate, lookback_years: u32) -> Self {
        // Month arithmetic clamps Feb 29 etc. to the last valid day.
        let past = today
            .checked_sub_months(Months::new(lookback_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);

        Self {
            start_month: month_label(past),
            end_month: month_label(today),
            start_quarter: quarter_label(past),
            end_quarter: quarter_label(today),
            start_year: year_label(past),
            end_year: year_label(today),
        }
    }

    pub fn today(lookback_years: u32) -> Self {
        Self::rolling(chrono::Local::now().date_naive(), lookback_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(quarter_of(d(2025, 1, 1)), 1);
        assert_eq!(quarter_of(d(2025, 3, 31)), 1);
        assert_eq!(quarter_of(d(2025, 4, 1)), 2);
        assert_eq!(quarter_of(d(2025, 9, 30)), 3);
        assert_eq!(quarter_of(d(2025, 12, 31)), 4);
    }

    #[test]
    fn labels() {
        assert_eq!(quarter_label(d(2025, 8, 15)), "2025Q3");
        assert_eq!(month_label(d(2025, 8, 15)), "202508");
        assert_eq!(year_label(d(2025, 8, 15)), "2025");
    }

    #[test]
    fn rolling_window_three_years() {
        let w = PeriodWindow::rolling(d(2025, 6, 20), DEFAULT_LOOKBACK_YEARS);
        assert_eq!(w.start_month, "202206");
        assert_eq!(w.end_month, "202506");
        assert_eq!(w.start_quarter, "2022Q2");
        assert_eq!(w.end_quarter, "2025Q2");
        assert_eq!(w.start_year, "2022");
        assert_eq!(w.end_year, "2025");
    }

    #[test]
    fn rolling_window_from_leap_day() {
        let w = PeriodWindow::rolling(d(2024, 2, 29), 1);
        assert_eq!(w.start_month, "202302");
        assert_eq!(w.start_quarter, "2023Q1");
    }
}
