//! Provider traits for retrieving the three datasets.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all dataset sources
//! - [`ValuationProvider`] - Dividend yield and valuation ratios
//! - [`AverageProvider`] - Closing price and monthly average price
//! - [`DetailProvider`] - Daily trading detail
//!
//! Providers return decoded rows; normalization happens after retrieval.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    dataset::Dataset,
    error::Result,
    raw::{RawAverage, RawDetail, RawValuation},
};

/// Base trait for all dataset providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "TWSE OpenAPI").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the datasets this provider can serve.
    fn datasets(&self) -> &[Dataset];
}

/// Provider for the valuation dataset.
#[async_trait]
pub trait ValuationProvider: DataProvider {
    /// Fetches the full valuation dataset.
    async fn fetch_valuations(&self) -> Result<Vec<RawValuation>>;
}

/// Provider for the average price dataset.
#[async_trait]
pub trait AverageProvider: DataProvider {
    /// Fetches the full average price dataset.
    async fn fetch_averages(&self) -> Result<Vec<RawAverage>>;
}

/// Provider for the daily trading detail dataset.
#[async_trait]
pub trait DetailProvider: DataProvider {
    /// Fetches the full daily trading detail dataset.
    async fn fetch_details(&self) -> Result<Vec<RawDetail>>;
}
