//! Runtime configuration: credentials, endpoints, and the artifact path.
//!
//! Values come from the environment (optionally seeded from a `.env` file);
//! CLI flags override them in `app`.

use std::path::PathBuf;

use crate::domain::Provider;

/// Workbook file written by `fetch` and read by the dashboard.
pub const DEFAULT_WORKBOOK: &str = "macro_indicators.xlsx";

pub const ECOS_BASE_URL: &str = "https://ecos.bok.or.kr/api";
pub const INDEX_BASE_URL: &str = "https://www.index.go.kr/unity/openApi/sttsJsonViewer.do";
pub const KOSIS_BASE_URL: &str = "https://kosis.kr/openapi/Param/statisticsParameterData.do";

/// Provider access keys. A missing key skips that provider's series.
#[derive(Clone, Default)]
pub struct Credentials {
    pub central_bank: Option<String>,
    pub index_portal: Option<String>,
    pub national_stats: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            central_bank: env_non_empty("ECOS_API_KEY"),
            index_portal: env_non_empty("INDEX_API_KEY"),
            national_stats: env_non_empty("KOSIS_API_KEY"),
        }
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::CentralBank => self.central_bank.as_deref(),
            Provider::IndexPortal => self.index_portal.as_deref(),
            Provider::NationalStats => self.national_stats.as_deref(),
        }
    }

    /// Same key for every provider (handy for tests against a mock server).
    pub fn uniform(key: &str) -> Self {
        Self {
            central_bank: Some(key.to_string()),
            index_portal: Some(key.to_string()),
            national_stats: Some(key.to_string()),
        }
    }
}

// Keys must never reach logs or panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("central_bank", &self.central_bank.is_some())
            .field("index_portal", &self.index_portal.is_some())
            .field("national_stats", &self.national_stats.is_some())
            .finish()
    }
}

/// Base URLs of the three providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub central_bank: String,
    pub index_portal: String,
    pub national_stats: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            central_bank: ECOS_BASE_URL.to_string(),
            index_portal: INDEX_BASE_URL.to_string(),
            national_stats: KOSIS_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            central_bank: env_non_empty("ECOS_BASE_URL").unwrap_or(defaults.central_bank),
            index_portal: env_non_empty("INDEX_BASE_URL").unwrap_or(defaults.index_portal),
            national_stats: env_non_empty("KOSIS_BASE_URL").unwrap_or(defaults.national_stats),
        }
    }

    /// Point every provider at one server, using the default URL paths.
    pub fn with_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            central_bank: format!("{host}/api"),
            index_portal: format!("{host}/unity/openApi/sttsJsonViewer.do"),
            national_stats: format!("{host}/openapi/Param/statisticsParameterData.do"),
        }
    }

    pub fn get(&self, provider: Provider) -> &str {
        match provider {
            Provider::CentralBank => &self.central_bank,
            Provider::IndexPortal => &self.index_portal,
            Provider::NationalStats => &self.national_stats,
        }
    }
}

/// Everything the fetch pipeline needs besides the catalog.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub workbook: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            credentials: Credentials::from_env(),
            endpoints: Endpoints::from_env(),
            workbook: env_non_empty("ECON_WORKBOOK")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK)),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
