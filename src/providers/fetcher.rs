//! Sequential fetch loop over all configured series.
//!
//! One blocking GET per series, in catalog order. Any series-level failure
//! (missing key, transport error, bad status, bad JSON, zero records) is logged
//! and recorded; the run always continues with the next series.

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{Credentials, Endpoints};
use crate::domain::SeriesRequest;
use crate::error::{AppError, ErrorKind};
use crate::providers::{NormalizedSeries, adapter_for};

/// A series that produced no table, and why.
#[derive(Debug, Clone)]
pub struct SkippedSeries {
    pub title: String,
    pub error: AppError,
}

/// Outcome of one fetch run.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully normalized series, in fetch order.
    pub series: Vec<NormalizedSeries>,
    pub skipped: Vec<SkippedSeries>,
}

pub struct Fetcher {
    client: Client,
    credentials: Credentials,
    endpoints: Endpoints,
}

impl Fetcher {
    pub fn new(credentials: Credentials, endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(),
            credentials,
            endpoints,
        }
    }

    pub fn fetch_all(&self, requests: &[SeriesRequest]) -> FetchReport {
        let mut report = FetchReport::default();
        for request in requests {
            match self.fetch_series(request) {
                Ok(series) => {
                    info!(
                        "fetched '{}' ({} rows) from {}",
                        series.title,
                        series.table.len(),
                        request.provider.tag()
                    );
                    report.series.push(series);
                }
                Err(error) => {
                    warn!(
                        "skipping '{}' [{}]: {}",
                        request.title,
                        error.kind().label(),
                        error
                    );
                    report.skipped.push(SkippedSeries {
                        title: request.title.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    pub fn fetch_series(&self, request: &SeriesRequest) -> Result<NormalizedSeries, AppError> {
        let provider = request.provider;
        let adapter = adapter_for(provider);

        let credential = self.credentials.get(provider).ok_or_else(|| {
            AppError::new(
                ErrorKind::Config,
                format!("{}: no API key configured.", provider.tag()),
            )
        })?;

        debug!(
            "{}: requesting '{}' ({} {}..{})",
            adapter.provider().tag(),
            request.title,
            request.stat_code,
            request.start_period,
            request.end_period
        );
        let resp = adapter
            .build_request(&self.client, self.endpoints.get(provider), credential, request)
            .send()
            // Transport errors can echo the URL, which carries the key.
            .map_err(|e| {
                AppError::new(
                    ErrorKind::Network,
                    format!("{} request failed: {}", provider.tag(), e.without_url()),
                )
            })?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                ErrorKind::Network,
                format!("{} request failed with status {}.", provider.tag(), resp.status()),
            ));
        }

        let body: Value = resp.json().map_err(|e| {
            AppError::new(
                ErrorKind::MalformedResponse,
                format!("Failed to parse {} response: {}", provider.tag(), e.without_url()),
            )
        })?;

        adapter.normalize(request, body)
    }
}
