//! Decoded record shapes, as delivered by the transport layer.
//!
//! Field names follow the TWSE OpenAPI JSON payloads. Every field that carries a
//! default in the normalized model is optional here and may also be blank.

use serde::{Deserialize, Serialize};

/// A row of the dividend yield / valuation dataset (`BWIBBU_ALL`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawValuation {
    /// Security code.
    pub code: String,
    /// Security name.
    pub name: String,
    /// Price-to-earnings ratio.
    #[serde(rename = "PEratio", default)]
    pub pe_ratio: Option<String>,
    /// Dividend yield in percent.
    #[serde(default)]
    pub dividend_yield: Option<String>,
    /// Price-to-book ratio.
    #[serde(rename = "PBratio")]
    pub pb_ratio: String,
    /// Price change.
    #[serde(default)]
    pub change: Option<String>,
    /// Monthly average price.
    #[serde(default)]
    pub monthly_average_price: Option<String>,
    /// Closing price.
    #[serde(default)]
    pub closing_price: Option<String>,
}

/// A row of the daily closing / monthly average dataset (`STOCK_DAY_AVG_ALL`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAverage {
    /// Security code.
    pub code: String,
    /// Security name.
    pub name: String,
    /// Closing price.
    #[serde(default)]
    pub closing_price: Option<String>,
    /// Monthly average price.
    #[serde(default)]
    pub monthly_average_price: Option<String>,
}

/// A row of the daily trading detail dataset (`STOCK_DAY_ALL`).
///
/// Any field other than the code and name may be absent or `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDetail {
    /// Security code.
    pub code: String,
    /// Security name.
    pub name: String,
    /// Number of shares traded.
    #[serde(default)]
    pub trade_volume: Option<String>,
    /// Traded value.
    #[serde(default)]
    pub trade_value: Option<String>,
    /// Opening price.
    #[serde(default)]
    pub opening_price: Option<String>,
    /// Highest price.
    #[serde(default)]
    pub highest_price: Option<String>,
    /// Lowest price.
    #[serde(default)]
    pub lowest_price: Option<String>,
    /// Closing price.
    #[serde(default)]
    pub closing_price: Option<String>,
    /// Price change.
    #[serde(default)]
    pub change: Option<String>,
    /// Number of transactions.
    #[serde(default)]
    pub transaction: Option<String>,
}
