//! Provider adapters and the fetch loop.
//!
//! Every provider is reached through the same [`ProviderAdapter`] seam: the
//! adapter builds the HTTP request and turns the decoded JSON body into a
//! named [`SeriesTable`]. The [`fetcher`] drives the adapters one series at a
//! time, in catalog order.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::{Provider, SeriesRequest};
use crate::error::{AppError, ErrorKind};
use crate::table::SeriesTable;

pub mod central_bank;
pub mod fetcher;
pub mod index_portal;
pub mod national_stats;

pub use central_bank::CentralBank;
pub use fetcher::{FetchReport, Fetcher, SkippedSeries};
pub use index_portal::IndexPortal;
pub use national_stats::NationalStats;

/// One successfully fetched and normalized series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSeries {
    /// Workbook title, e.g. `[ECOS] 실질GDP` (not yet sanitized).
    pub title: String,
    pub table: SeriesTable,
}

/// Request builder + response normalizer for one provider.
pub trait ProviderAdapter {
    fn provider(&self) -> Provider;

    /// Build the GET request; the credential goes into the URL or query string.
    fn build_request(
        &self,
        client: &Client,
        base_url: &str,
        credential: &str,
        request: &SeriesRequest,
    ) -> RequestBuilder;

    /// Map a decoded body into a table.
    ///
    /// Errors with `MalformedResponse` when the body is not the expected shape and
    /// `EmptyResponse` when it carries zero records.
    fn normalize(&self, request: &SeriesRequest, body: Value) -> Result<NormalizedSeries, AppError>;
}

static CENTRAL_BANK: CentralBank = CentralBank;
static INDEX_PORTAL: IndexPortal = IndexPortal;
static NATIONAL_STATS: NationalStats = NationalStats;

/// Adapter for a provider.
pub fn adapter_for(provider: Provider) -> &'static dyn ProviderAdapter {
    match provider {
        Provider::CentralBank => &CENTRAL_BANK,
        Provider::IndexPortal => &INDEX_PORTAL,
        Provider::NationalStats => &NATIONAL_STATS,
    }
}

/// Shared check for providers that answer with a bare JSON array.
pub(crate) fn bare_records(provider: Provider, title: &str, body: Value) -> Result<Vec<Value>, AppError> {
    match body {
        Value::Array(records) if records.is_empty() => Err(AppError::new(
            ErrorKind::EmptyResponse,
            format!("{}: no records for '{title}'.", provider.tag()),
        )),
        Value::Array(records) => Ok(records),
        other => Err(AppError::new(
            ErrorKind::MalformedResponse,
            format!(
                "{}: expected a JSON array for '{title}', got {}.",
                provider.tag(),
                describe(&other)
            ),
        )),
    }
}

pub(crate) fn describe(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= 80 {
        return text;
    }
    let mut out: String = text.chars().take(77).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adapters_report_their_provider() {
        for provider in Provider::ALL {
            assert_eq!(adapter_for(provider).provider(), provider);
        }
    }

    #[test]
    fn bare_records_classifies_shapes() {
        let ok = bare_records(Provider::IndexPortal, "t", json!([{"a": 1}])).unwrap();
        assert_eq!(ok.len(), 1);

        let empty = bare_records(Provider::IndexPortal, "t", json!([])).unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::EmptyResponse);

        let malformed = bare_records(Provider::NationalStats, "t", json!({"err": "30"})).unwrap_err();
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn describe_truncates_long_bodies() {
        let long = json!({"message": "x".repeat(200)});
        let text = describe(&long);
        assert_eq!(text.chars().count(), 80);
        assert!(text.ends_with("..."));
    }
}
