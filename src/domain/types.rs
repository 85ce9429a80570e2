//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from a JSON series catalog
//! - selected from the command line
//! - passed unchanged through a fetch run

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::period::PeriodWindow;

/// One of the three upstream statistics APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Bank of Korea ECOS statistics service.
    CentralBank,
    /// e-나라지표 (index.go.kr) open API.
    IndexPortal,
    /// KOSIS national statistics service.
    NationalStats,
}

impl Provider {
    pub const ALL: [Provider; 3] = [
        Provider::CentralBank,
        Provider::IndexPortal,
        Provider::NationalStats,
    ];

    /// Short tag used as the sheet-title prefix.
    pub fn tag(self) -> &'static str {
        match self {
            Provider::CentralBank => "ECOS",
            Provider::IndexPortal => "지표누리",
            Provider::NationalStats => "KOSIS",
        }
    }
}

/// Observation frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    Quarterly,
}

impl Granularity {
    /// Single-letter period code shared by ECOS and KOSIS.
    pub fn code(self) -> &'static str {
        match self {
            Granularity::Monthly => "M",
            Granularity::Quarterly => "Q",
        }
    }
}

/// One configured series, as written in a catalog.
///
/// `start`/`end` pin a fixed range; when absent the range is taken from the
/// rolling [`PeriodWindow`] at resolve time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub title: String,
    pub provider: Provider,
    pub stat_code: String,
    pub granularity: Granularity,
    pub item_code_1: String,
    #[serde(default)]
    pub item_code_2: Option<String>,
    /// KOSIS organisation id (ignored by the other providers).
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl SeriesSpec {
    pub fn new(
        title: &str,
        provider: Provider,
        stat_code: &str,
        granularity: Granularity,
        item_code_1: &str,
        item_code_2: Option<&str>,
    ) -> Self {
        Self {
            title: title.to_string(),
            provider,
            stat_code: stat_code.to_string(),
            granularity,
            item_code_1: item_code_1.to_string(),
            item_code_2: item_code_2.map(str::to_string),
            org_id: None,
            start: None,
            end: None,
        }
    }

    pub fn with_org_id(mut self, org_id: &str) -> Self {
        self.org_id = Some(org_id.to_string());
        self
    }

    /// Freeze this entry into a request for one fetch run.
    pub fn resolve(&self, window: &PeriodWindow) -> SeriesRequest {
        let (rolling_start, rolling_end) = match self.granularity {
            Granularity::Monthly => (&window.start_month, &window.end_month),
            Granularity::Quarterly => (&window.start_quarter, &window.end_quarter),
        };

        SeriesRequest {
            title: self.title.clone(),
            provider: self.provider,
            stat_code: self.stat_code.clone(),
            granularity: self.granularity,
            start_period: self.start.clone().unwrap_or_else(|| rolling_start.clone()),
            end_period: self.end.clone().unwrap_or_else(|| rolling_end.clone()),
            item_code_1: self.item_code_1.clone(),
            item_code_2: self.item_code_2.clone(),
            org_id: self.org_id.clone(),
        }
    }
}

/// Fully-resolved parameters for one provider request.
///
/// Built once per series at the start of a run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub title: String,
    pub provider: Provider,
    pub stat_code: String,
    pub granularity: Granularity,
    pub start_period: String,
    pub end_period: String,
    pub item_code_1: String,
    pub item_code_2: Option<String>,
    pub org_id: Option<String>,
}

impl SeriesRequest {
    /// Four-digit year prefix of a period label (`202403` -> `2024`).
    pub fn start_year(&self) -> &str {
        year_prefix(&self.start_period)
    }

    pub fn end_year(&self) -> &str {
        year_prefix(&self.end_period)
    }
}

fn year_prefix(label: &str) -> &str {
    match label.char_indices().nth(4) {
        Some((idx, _)) => &label[..idx],
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> PeriodWindow {
        PeriodWindow::rolling(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(), 3)
    }

    #[test]
    fn resolve_uses_rolling_window_by_granularity() {
        let monthly = SeriesSpec::new("CPI", Provider::CentralBank, "901Y009", Granularity::Monthly, "0", None);
        let req = monthly.resolve(&window());
        assert_eq!(req.start_period, "202206");
        assert_eq!(req.end_period, "202506");

        let quarterly = SeriesSpec::new("GDP", Provider::CentralBank, "200Y106", Granularity::Quarterly, "1400", None);
        let req = quarterly.resolve(&window());
        assert_eq!(req.start_period, "2022Q2");
        assert_eq!(req.end_period, "2025Q2");
    }

    #[test]
    fn pinned_range_wins() {
        let mut spec = SeriesSpec::new("GDP", Provider::CentralBank, "200Y106", Granularity::Quarterly, "1400", None);
        spec.start = Some("2022Q1".to_string());
        spec.end = Some("2025Q2".to_string());
        let req = spec.resolve(&window());
        assert_eq!(req.start_period, "2022Q1");
        assert_eq!(req.end_period, "2025Q2");
        assert_eq!(req.start_year(), "2022");
    }

    #[test]
    fn spec_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "title": "시장금리",
            "provider": "index_portal",
            "stat_code": "107301",
            "granularity": "monthly",
            "item_code_1": "1073"
        }"#;
        let spec: SeriesSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.provider, Provider::IndexPortal);
        assert_eq!(spec.item_code_2, None);
        assert_eq!(spec.start, None);
    }
}
