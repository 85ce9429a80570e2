//! KOSIS `statisticsParameterData` integration.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::{Provider, SeriesRequest};
use crate::error::AppError;
use crate::providers::{NormalizedSeries, ProviderAdapter, bare_records};
use crate::table::{ColumnMap, columns, field_text, normalize_records};

const DEFAULT_ORG_ID: &str = "101";

const LAYOUT: &[ColumnMap] = &[
    ColumnMap::new(columns::STAT_NAME, "TBL_NM"),
    ColumnMap::new(columns::CATEGORY, "C1_NM"),
    ColumnMap::new(columns::ITEM, "ITM_NM"),
    ColumnMap::new(columns::DATE, "PRD_DE"),
    ColumnMap::new(columns::UNIT, "UNIT_NM"),
    ColumnMap::new(columns::VALUE, "DT"),
];

pub struct NationalStats;

impl NationalStats {
    /// The URL is assembled by hand: `itmId`/`objL1` lists use literal `+`
    /// separators that must not be percent-encoded.
    pub fn url(base_url: &str, credential: &str, request: &SeriesRequest) -> String {
        let mut url = format!(
            "{base_url}?method=getList&apiKey={credential}&itmId={}",
            request.item_code_1
        );
        if let Some(obj) = request.item_code_2.as_deref().filter(|s| !s.is_empty()) {
            url.push_str("&objL1=");
            url.push_str(obj);
        }
        url.push_str(&format!(
            "&format=json&jsonVD=Y&prdSe={}&startPrdDe={}&endPrdDe={}&orgId={}&tblId={}",
            request.granularity.code(),
            period_code(&request.start_period),
            period_code(&request.end_period),
            request.org_id.as_deref().unwrap_or(DEFAULT_ORG_ID),
            request.stat_code,
        ));
        url
    }
}

/// KOSIS writes quarters as `YYYY0n`, not `YYYYQn`.
fn period_code(label: &str) -> String {
    label.replace('Q', "0")
}

impl ProviderAdapter for NationalStats {
    fn provider(&self) -> Provider {
        Provider::NationalStats
    }

    fn build_request(
        &self,
        client: &Client,
        base_url: &str,
        credential: &str,
        request: &SeriesRequest,
    ) -> RequestBuilder {
        client.get(Self::url(base_url, credential, request))
    }

    fn normalize(&self, request: &SeriesRequest, body: Value) -> Result<NormalizedSeries, AppError> {
        let records = bare_records(Provider::NationalStats, &request.title, body)?;

        // The sheet is named after the table the service reports.
        let table_name = records
            .first()
            .map(|r| field_text(r, "TBL_NM"))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| request.title.clone());

        Ok(NormalizedSeries {
            title: format!("[{}] {}", Provider::NationalStats.tag(), table_name),
            table: normalize_records(LAYOUT, &records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Granularity;
    use serde_json::json;

    fn request(granularity: Granularity, start: &str, end: &str) -> SeriesRequest {
        SeriesRequest {
            title: "KOSIS_지표".to_string(),
            provider: Provider::NationalStats,
            stat_code: "DT_1J22042".to_string(),
            granularity,
            start_period: start.to_string(),
            end_period: end.to_string(),
            item_code_1: "T02+T03+T04+".to_string(),
            item_code_2: Some("0+1+2+4+3+".to_string()),
            org_id: None,
        }
    }

    #[test]
    fn url_keeps_plus_separators() {
        let url = NationalStats::url("https://kosis.kr/x.do", "KEY", &request(Granularity::Monthly, "202206", "202506"));
        assert_eq!(
            url,
            "https://kosis.kr/x.do?method=getList&apiKey=KEY&itmId=T02+T03+T04+&objL1=0+1+2+4+3+\
             &format=json&jsonVD=Y&prdSe=M&startPrdDe=202206&endPrdDe=202506&orgId=101&tblId=DT_1J22042"
        );
    }

    #[test]
    fn quarterly_labels_are_rewritten() {
        let url = NationalStats::url("b", "k", &request(Granularity::Quarterly, "2022Q2", "2025Q2"));
        assert!(url.contains("prdSe=Q&startPrdDe=202202&endPrdDe=202502"));
    }

    #[test]
    fn title_comes_from_first_record() {
        let body = json!([
            {"TBL_NM": "광업제조업동향", "C1_NM": "광공업", "ITM_NM": "원지수", "PRD_DE": "202501", "UNIT_NM": "2020=100", "DT": "110.2"}
        ]);
        let series = NationalStats.normalize(&request(Granularity::Monthly, "a", "b"), body).unwrap();
        assert_eq!(series.title, "[KOSIS] 광업제조업동향");
        assert_eq!(series.table.columns.len(), 6);
        assert_eq!(series.table.cell(0, "지수종류"), Some("광공업"));
    }

    #[test]
    fn title_falls_back_to_configured_title() {
        let body = json!([{"PRD_DE": "202501", "DT": "1"}]);
        let series = NationalStats.normalize(&request(Granularity::Monthly, "a", "b"), body).unwrap();
        assert_eq!(series.title, "[KOSIS] KOSIS_지표");
    }
}
