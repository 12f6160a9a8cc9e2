//! Numeric field normalization.
//!
//! The upstream datasets carry every number as text, and any of those texts
//! may be absent, blank, or something that is not a number at all. [`normalize`]
//! maps all of them onto a plain `f64` with a caller-supplied default, and
//! [`NumericField`] keeps the parsed value next to the source text so display
//! layers can still show what the service actually sent.

use serde::{Deserialize, Serialize};

/// Default substituted for any missing or malformed numeric field.
pub const DEFAULT_NUMERIC: f64 = 0.0;

/// Parses `raw` as a number, falling back to `default`.
///
/// The input is trimmed first. Absent, blank and unparseable inputs yield
/// `default`, as do non-finite parses such as `NaN` or `inf`. Never fails.
///
/// ```
/// use twse_core::normalize;
///
/// assert_eq!(normalize(Some(" 12.5 "), 0.0), 12.5);
/// assert_eq!(normalize(Some(""), 0.0), 0.0);
/// assert_eq!(normalize(None, -1.0), -1.0);
/// assert_eq!(normalize(Some("N/A"), 0.0), 0.0);
/// ```
#[must_use]
pub fn normalize(raw: Option<&str>, default: f64) -> f64 {
    parse_finite(raw).unwrap_or(default)
}

fn parse_finite(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A numeric value decoded from text, together with the text it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    raw: Option<String>,
    value: f64,
    defaulted: bool,
}

impl NumericField {
    /// Normalizes `raw`, substituting [`DEFAULT_NUMERIC`] when it does not parse.
    #[must_use]
    pub fn parse(raw: Option<String>) -> Self {
        Self::parse_or(raw, DEFAULT_NUMERIC)
    }

    /// Normalizes `raw`, substituting `default` when it does not parse.
    #[must_use]
    pub fn parse_or(raw: Option<String>, default: f64) -> Self {
        match parse_finite(raw.as_deref()) {
            Some(value) => Self {
                raw,
                value,
                defaulted: false,
            },
            None => Self {
                raw,
                value: default,
                defaulted: true,
            },
        }
    }

    /// Returns the normalized value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the source text, if the field was present at all.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Returns true if the default was substituted.
    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        self.defaulted
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        Self {
            raw: Some(value.to_string()),
            value,
            defaulted: false,
        }
    }
}
