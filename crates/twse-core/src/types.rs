//! Normalized record types.
//!
//! This module defines the records held by the store and served to display layers:
//!
//! - [`StockCode`] - Security code, the join key across datasets
//! - [`ValuationRecord`] - Dividend yield and valuation ratios (anchor dataset)
//! - [`AverageRecord`] - Closing and monthly average price
//! - [`DetailRecord`] - Daily trading detail
//! - [`AggregateRecord`] - One security joined across all three datasets
//!
//! All of them are immutable once constructed; a refresh replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::NumericField;
use crate::raw::{RawAverage, RawDetail, RawValuation};

/// A security code.
///
/// Codes are compared as exact, case-sensitive strings and are never trimmed or
/// padded; datasets are expected to agree on their spelling. A code is never
/// empty or whitespace-only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode(String);

impl StockCode {
    /// Creates a code, returning `None` for empty or whitespace-only input.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StockCode {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::new(code).ok_or_else(|| "security code must not be blank".to_string())
    }
}

impl From<StockCode> for String {
    fn from(code: StockCode) -> Self {
        code.0
    }
}

impl AsRef<str> for StockCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Dividend yield and valuation metrics for one security.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    /// Security code.
    pub code: StockCode,
    /// Security name.
    pub name: String,
    /// Price-to-earnings ratio.
    pub pe_ratio: NumericField,
    /// Dividend yield in percent.
    pub dividend_yield: NumericField,
    /// Price-to-book ratio, as published.
    pub pb_ratio: String,
    /// Price change.
    pub change: NumericField,
    /// Monthly average price.
    pub monthly_average_price: NumericField,
    /// Closing price.
    pub closing_price: NumericField,
}

impl ValuationRecord {
    /// Creates a record with every defaulted numeric field absent.
    #[must_use]
    pub fn new(code: StockCode, name: impl Into<String>, pb_ratio: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            pe_ratio: NumericField::parse(None),
            dividend_yield: NumericField::parse(None),
            pb_ratio: pb_ratio.into(),
            change: NumericField::parse(None),
            monthly_average_price: NumericField::parse(None),
            closing_price: NumericField::parse(None),
        }
    }

    /// Normalizes a decoded row under an already validated code.
    #[must_use]
    pub fn from_raw(code: StockCode, raw: RawValuation) -> Self {
        Self {
            code,
            name: raw.name,
            pe_ratio: NumericField::parse(raw.pe_ratio),
            dividend_yield: NumericField::parse(raw.dividend_yield),
            pb_ratio: raw.pb_ratio,
            change: NumericField::parse(raw.change),
            monthly_average_price: NumericField::parse(raw.monthly_average_price),
            closing_price: NumericField::parse(raw.closing_price),
        }
    }

    /// Sets the price-to-earnings ratio.
    #[must_use]
    pub fn with_pe_ratio(mut self, pe_ratio: f64) -> Self {
        self.pe_ratio = pe_ratio.into();
        self
    }

    /// Sets the dividend yield.
    #[must_use]
    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield.into();
        self
    }

    /// Sets the closing price.
    #[must_use]
    pub fn with_closing_price(mut self, closing_price: f64) -> Self {
        self.closing_price = closing_price.into();
        self
    }

    /// Number of numeric fields that fell back to their default.
    #[must_use]
    pub fn defaulted_fields(&self) -> usize {
        [
            &self.pe_ratio,
            &self.dividend_yield,
            &self.change,
            &self.monthly_average_price,
            &self.closing_price,
        ]
        .iter()
        .filter(|f| f.is_defaulted())
        .count()
    }
}

/// Closing price and monthly average price for one security.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    /// Security code.
    pub code: StockCode,
    /// Security name.
    pub name: String,
    /// Closing price.
    pub closing_price: NumericField,
    /// Monthly average price.
    pub monthly_average_price: NumericField,
}

impl AverageRecord {
    /// Creates a record from already numeric prices.
    #[must_use]
    pub fn new(
        code: StockCode,
        name: impl Into<String>,
        closing_price: f64,
        monthly_average_price: f64,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            closing_price: closing_price.into(),
            monthly_average_price: monthly_average_price.into(),
        }
    }

    /// Normalizes a decoded row under an already validated code.
    #[must_use]
    pub fn from_raw(code: StockCode, raw: RawAverage) -> Self {
        Self {
            code,
            name: raw.name,
            closing_price: NumericField::parse(raw.closing_price),
            monthly_average_price: NumericField::parse(raw.monthly_average_price),
        }
    }

    /// Number of numeric fields that fell back to their default.
    #[must_use]
    pub fn defaulted_fields(&self) -> usize {
        usize::from(self.closing_price.is_defaulted())
            + usize::from(self.monthly_average_price.is_defaulted())
    }
}

/// Daily trading detail for one security.
///
/// Everything except [`change`](Self::change) is kept as published; formatting
/// (thousands separators and the like) is left to the display layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Security code.
    pub code: StockCode,
    /// Security name.
    pub name: String,
    /// Number of shares traded.
    pub trade_volume: String,
    /// Traded value.
    pub trade_value: String,
    /// Opening price.
    pub opening_price: String,
    /// Highest price.
    pub highest_price: String,
    /// Lowest price.
    pub lowest_price: String,
    /// Closing price.
    pub closing_price: String,
    /// Price change, parsed.
    pub change: NumericField,
    /// Number of transactions.
    pub transaction_count: String,
}

impl DetailRecord {
    /// Normalizes a decoded row under an already validated code.
    #[must_use]
    pub fn from_raw(code: StockCode, raw: RawDetail) -> Self {
        Self {
            code,
            name: raw.name,
            trade_volume: raw.trade_volume.unwrap_or_default(),
            trade_value: raw.trade_value.unwrap_or_default(),
            opening_price: raw.opening_price.unwrap_or_default(),
            highest_price: raw.highest_price.unwrap_or_default(),
            lowest_price: raw.lowest_price.unwrap_or_default(),
            closing_price: raw.closing_price.unwrap_or_default(),
            change: NumericField::parse(raw.change),
            transaction_count: raw.transaction.unwrap_or_default(),
        }
    }

    /// Number of numeric fields that fell back to their default.
    #[must_use]
    pub fn defaulted_fields(&self) -> usize {
        usize::from(self.change.is_defaulted())
    }
}

/// One security joined across the three datasets.
///
/// The valuation record is always present; the other two are absent when
/// their dataset has no row for the code or has not been loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Valuation metrics (anchor).
    pub valuation: ValuationRecord,
    /// Closing and monthly average price, if known.
    pub average: Option<AverageRecord>,
    /// Daily trading detail, if known.
    pub detail: Option<DetailRecord>,
}

impl AggregateRecord {
    /// Returns the join key.
    #[must_use]
    pub fn code(&self) -> &StockCode {
        &self.valuation.code
    }
}
