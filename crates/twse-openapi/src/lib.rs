#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/twse-board/twse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! TWSE OpenAPI data provider.
//!
//! This crate provides a provider for the Taiwan Stock Exchange OpenAPI that
//! implements [`DataProvider`], [`ValuationProvider`], [`AverageProvider`] and
//! [`DetailProvider`] from `twse-core`.
//!
//! # Example
//!
//! ```no_run
//! use twse_openapi::TwseProvider;
//! use twse_core::ValuationProvider;
//!
//! # async fn example() -> twse_core::Result<()> {
//! let provider = TwseProvider::new();
//! let rows = provider.fetch_valuations().await?;
//! println!("Fetched {} valuation rows", rows.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use twse_core::{
    AverageProvider, DataProvider, Dataset, DetailProvider, RawAverage, RawDetail, RawValuation,
    Result, TwseError, ValuationProvider,
};

/// TWSE OpenAPI base URL.
pub const DEFAULT_BASE_URL: &str = "https://openapi.twse.com.tw/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent for HTTP requests.
const USER_AGENT: &str = concat!("twse-openapi/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`TwseProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwseConfig {
    /// Base URL the dataset paths are appended to.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for TwseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl TwseConfig {
    /// Sets the base URL. A trailing slash is ignored.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// TWSE OpenAPI provider.
///
/// Implements [`DataProvider`], [`ValuationProvider`], [`AverageProvider`] and
/// [`DetailProvider`]. Each fetch is a single unpaginated GET returning a JSON array.
#[derive(Debug)]
pub struct TwseProvider {
    client: reqwest::Client,
    base_url: String,
}

impl TwseProvider {
    /// Create a provider with default settings.
    #[must_use]
    pub fn new() -> Self {
        let config = TwseConfig::default();
        Self::try_with_config(config.clone()).unwrap_or_else(|_| {
            Self::with_client(reqwest::Client::new(), config.base_url)
        })
    }

    /// Create a provider from explicit settings.
    pub fn try_with_config(config: TwseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TwseError::Network(e.to_string()))?;
        Ok(Self::with_client(client, config.base_url))
    }

    /// Create a provider that uses `client` for all requests.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL of a dataset.
    fn dataset_url(&self, dataset: Dataset) -> String {
        format!("{}/exchangeReport/{}", self.base_url, endpoint(dataset))
    }

    /// Fetch a dataset and decode it as a JSON array of `T`.
    #[instrument(skip(self, dataset), fields(dataset = %dataset))]
    async fn fetch_rows<T: DeserializeOwned>(&self, dataset: Dataset) -> Result<Vec<T>> {
        let url = self.dataset_url(dataset);
        debug!("Fetching dataset: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TwseError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TwseError::Http {
                status: response.status().as_u16(),
                dataset,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TwseError::Network(e.to_string()))?;

        let rows = decode_rows::<T>(&body)?;
        debug!(count = rows.len(), "Decoded dataset");
        Ok(rows)
    }
}

impl Default for TwseProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Path segment of a dataset under `exchangeReport/`.
#[must_use]
pub const fn endpoint(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Valuation => "BWIBBU_ALL",
        Dataset::Average => "STOCK_DAY_AVG_ALL",
        Dataset::Detail => "STOCK_DAY_ALL",
    }
}

/// Decode a response body as a JSON array of rows.
fn decode_rows<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    serde_json::from_slice(body).map_err(|e| TwseError::Parse(e.to_string()))
}

impl DataProvider for TwseProvider {
    fn name(&self) -> &str {
        "TWSE OpenAPI"
    }

    fn description(&self) -> &str {
        "Taiwan Stock Exchange OpenAPI: valuation ratios, average prices and daily trading"
    }

    fn datasets(&self) -> &[Dataset] {
        &Dataset::ALL
    }
}

#[async_trait]
impl ValuationProvider for TwseProvider {
    async fn fetch_valuations(&self) -> Result<Vec<RawValuation>> {
        self.fetch_rows(Dataset::Valuation).await
    }
}

#[async_trait]
impl AverageProvider for TwseProvider {
    async fn fetch_averages(&self) -> Result<Vec<RawAverage>> {
        self.fetch_rows(Dataset::Average).await
    }
}

#[async_trait]
impl DetailProvider for TwseProvider {
    async fn fetch_details(&self) -> Result<Vec<RawDetail>> {
        self.fetch_rows(Dataset::Detail).await
    }
}
