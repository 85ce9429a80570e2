//! e-나라지표 (index.go.kr) open API integration.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::{Provider, SeriesRequest};
use crate::error::AppError;
use crate::providers::{NormalizedSeries, ProviderAdapter, bare_records};
use crate::table::{ColumnMap, columns, normalize_records};

// The portal already uses Korean keys; we keep them as column names.
const LAYOUT: &[ColumnMap] = &[
    ColumnMap::new(columns::ITEM_LABEL, "항목이름"),
    ColumnMap::new(columns::PERIOD, "시점"),
    ColumnMap::new(columns::VALUE, "값"),
    ColumnMap::new(columns::UNIT, "단위"),
];

pub struct IndexPortal;

impl IndexPortal {
    /// `YYYY:YYYY` period range; the portal is queried by year.
    pub fn period(request: &SeriesRequest) -> String {
        format!("{}:{}", request.start_year(), request.end_year())
    }

    pub fn query(credential: &str, request: &SeriesRequest) -> Vec<(&'static str, String)> {
        vec![
            ("idntfcId", credential.to_string()),
            ("statsCode", request.stat_code.clone()),
            ("ixCode", request.item_code_1.clone()),
            ("period", Self::period(request)),
        ]
    }
}

impl ProviderAdapter for IndexPortal {
    fn provider(&self) -> Provider {
        Provider::IndexPortal
    }

    fn build_request(
        &self,
        client: &Client,
        base_url: &str,
        credential: &str,
        request: &SeriesRequest,
    ) -> RequestBuilder {
        client.get(base_url).query(&Self::query(credential, request))
    }

    fn normalize(&self, request: &SeriesRequest, body: Value) -> Result<NormalizedSeries, AppError> {
        let records = bare_records(Provider::IndexPortal, &request.title, body)?;
        Ok(NormalizedSeries {
            title: format!("[{}] {}", Provider::IndexPortal.tag(), request.title),
            table: normalize_records(LAYOUT, &records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Granularity;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn request() -> SeriesRequest {
        SeriesRequest {
            title: "시장금리".to_string(),
            provider: Provider::IndexPortal,
            stat_code: "107301".to_string(),
            granularity: Granularity::Monthly,
            start_period: "202206".to_string(),
            end_period: "202506".to_string(),
            item_code_1: "1073".to_string(),
            item_code_2: None,
            org_id: None,
        }
    }

    #[test]
    fn query_uses_year_range() {
        let query = IndexPortal::query("KEY", &request());
        assert!(query.contains(&("period", "2022:2025".to_string())));
        assert!(query.contains(&("ixCode", "1073".to_string())));
        assert!(query.contains(&("idntfcId", "KEY".to_string())));
    }

    #[test]
    fn normalizes_bare_array() {
        let body = json!([
            {"항목이름": "국고채(3년)", "시점": "2024.01", "값": "3.28", "단위": "%", "주기": "M"},
            {"항목이름": "회사채(3년, AA-)", "시점": "2024.01", "값": "3.97"}
        ]);
        let series = IndexPortal.normalize(&request(), body).unwrap();
        assert_eq!(series.title, "[지표누리] 시장금리");
        assert_eq!(series.table.columns, vec!["항목이름", "시점", "값", "단위"]);
        assert_eq!(series.table.cell(1, "단위"), Some(""));
    }

    #[test]
    fn empty_array_is_skipped() {
        let err = IndexPortal.normalize(&request(), json!([])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }
}
