//! Dataset identifiers.
//!
//! This module defines [`Dataset`], naming the three independently retrieved
//! datasets that make up the aggregate view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three remote datasets describing listed securities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    /// Dividend yield and valuation ratios. This is the anchor dataset.
    Valuation,
    /// Daily closing price and monthly average price.
    Average,
    /// Daily trading detail (volume, value, OHLC, transactions).
    Detail,
}

impl Dataset {
    /// All datasets, in the order they are reported.
    pub const ALL: [Self; 3] = [Self::Valuation, Self::Average, Self::Detail];

    /// Returns a short lowercase name, suitable for log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Valuation => "valuation",
            Self::Average => "average",
            Self::Detail => "detail",
        }
    }

    /// Returns true for the dataset whose codes define the aggregate entries.
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        matches!(self, Self::Valuation)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
