//! Bank of Korea ECOS `StatisticSearch` integration.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::{Provider, SeriesRequest};
use crate::error::{AppError, ErrorKind};
use crate::providers::{NormalizedSeries, ProviderAdapter, describe};
use crate::table::{ColumnMap, columns, normalize_records};

/// Rows requested per call (the service pages by row index).
const PAGE_ROWS: usize = 1000;

const LAYOUT: &[ColumnMap] = &[
    ColumnMap::new(columns::ITEM_NAME, "ITEM_NAME1"),
    ColumnMap::new(columns::UNIT, "UNIT_NAME"),
    ColumnMap::new(columns::PERIOD, "TIME"),
    ColumnMap::new(columns::INDICATOR_VALUE, "DATA_VALUE"),
];

pub struct CentralBank;

impl CentralBank {
    pub fn url(base_url: &str, credential: &str, request: &SeriesRequest) -> String {
        let base = base_url.trim_end_matches('/');
        let mut url = format!(
            "{base}/StatisticSearch/{credential}/json/kr/1/{PAGE_ROWS}/{}/{}/{}/{}/{}",
            request.stat_code,
            request.granularity.code(),
            request.start_period,
            request.end_period,
            request.item_code_1,
        );
        if let Some(item2) = request.item_code_2.as_deref().filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(item2);
        }
        url
    }
}

impl ProviderAdapter for CentralBank {
    fn provider(&self) -> Provider {
        Provider::CentralBank
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
        let mut envelope = match body {
            Value::Object(map) => map,
            other => {
                return Err(AppError::new(
                    ErrorKind::MalformedResponse,
                    format!("ECOS: expected a JSON object for '{}', got {}.", request.title, describe(&other)),
                ));
            }
        };

        // "No data" and key errors come back as {"RESULT": {"CODE": .., "MESSAGE": ..}}.
        let Some(search) = envelope.remove("StatisticSearch") else {
            let notice = envelope
                .get("RESULT")
                .and_then(|r| r.get("MESSAGE"))
                .and_then(Value::as_str)
                .unwrap_or("no StatisticSearch envelope");
            return Err(AppError::new(
                ErrorKind::EmptyResponse,
                format!("ECOS: no records for '{}' ({notice}).", request.title),
            ));
        };

        let records = match search.get("row") {
            None => Vec::new(),
            Some(Value::Array(rows)) => rows.clone(),
            Some(other) => {
                return Err(AppError::new(
                    ErrorKind::MalformedResponse,
                    format!("ECOS: 'row' is not an array for '{}': {}.", request.title, describe(other)),
                ));
            }
        };

        if records.is_empty() {
            return Err(AppError::new(
                ErrorKind::EmptyResponse,
                format!("ECOS: no records for '{}'.", request.title),
            ));
        }

        Ok(NormalizedSeries {
            title: format!("[{}] {}", Provider::CentralBank.tag(), request.title),
            table: normalize_records(LAYOUT, &records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Granularity;
    use serde_json::json;

    fn request(item2: Option<&str>) -> SeriesRequest {
        SeriesRequest {
            title: "환율(달러)".to_string(),
            provider: Provider::CentralBank,
            stat_code: "731Y006".to_string(),
            granularity: Granularity::Monthly,
            start_period: "202401".to_string(),
            end_period: "202506".to_string(),
            item_code_1: "0000002".to_string(),
            item_code_2: item2.map(str::to_string),
            org_id: None,
        }
    }

    #[test]
    fn url_with_and_without_second_item() {
        let url = CentralBank::url("https://ecos.bok.or.kr/api/", "KEY", &request(Some("0000100")));
        assert_eq!(
            url,
            "https://ecos.bok.or.kr/api/StatisticSearch/KEY/json/kr/1/1000/731Y006/M/202401/202506/0000002/0000100"
        );
        let url = CentralBank::url("https://ecos.bok.or.kr/api", "KEY", &request(None));
        assert!(url.ends_with("/202401/202506/0000002"));
    }

    #[test]
    fn normalizes_rows() {
        let body = json!({
            "StatisticSearch": {
                "list_total_count": 2,
                "row": [
                    {"ITEM_NAME1": "원/미국달러", "UNIT_NAME": "원", "TIME": "202401", "DATA_VALUE": "1,323.57"},
                    {"ITEM_NAME1": "원/미국달러", "UNIT_NAME": "원", "TIME": "202402", "DATA_VALUE": "1331.74"}
                ]
            }
        });
        let series = CentralBank.normalize(&request(None), body).unwrap();
        assert_eq!(series.title, "[ECOS] 환율(달러)");
        assert_eq!(series.table.columns, vec!["항목명", "단위", "시점", "지표값"]);
        assert_eq!(series.table.len(), 2);
        assert_eq!(series.table.cell(0, "지표값"), Some("1,323.57"));
    }

    #[test]
    fn result_notice_is_an_empty_response() {
        let body = json!({"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}});
        let err = CentralBank.normalize(&request(None), body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert!(err.message().contains("해당하는 데이터가 없습니다."));
    }

    #[test]
    fn empty_row_list_is_an_empty_response() {
        let body = json!({"StatisticSearch": {"row": []}});
        let err = CentralBank.normalize(&request(None), body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[test]
    fn non_object_body_is_malformed() {
        let err = CentralBank.normalize(&request(None), json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = CentralBank
            .normalize(&request(None), json!({"StatisticSearch": {"row": "oops"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
