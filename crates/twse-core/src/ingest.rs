//! Raw-to-normalized record conversion.
//!
//! [`ingest`] is applied once per fetched dataset. It normalizes every numeric
//! field, drops rows that cannot take part in a join (blank code) or can never
//! be reached by one (a repeated code, since lookups take the first match), and
//! reports each dropped row as a [`Diagnostic`] instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::dataset::Dataset;
use crate::raw::{RawAverage, RawDetail, RawValuation};
use crate::types::{AverageRecord, DetailRecord, StockCode, ValuationRecord};

/// A decoded row that can be normalized into a stored record.
pub trait RawRecord {
    /// The normalized record type.
    type Record;

    /// The dataset this row belongs to.
    const DATASET: Dataset;

    /// The code as delivered, possibly blank.
    fn raw_code(&self) -> &str;

    /// Normalizes the row under a validated code.
    fn into_record(self, code: StockCode) -> Self::Record;

    /// Counts numeric fields of the normalized record that fell back to their default.
    fn defaulted_fields(record: &Self::Record) -> usize;
}

impl RawRecord for RawValuation {
    type Record = ValuationRecord;
    const DATASET: Dataset = Dataset::Valuation;

    fn raw_code(&self) -> &str {
        &self.code
    }

    fn into_record(self, code: StockCode) -> Self::Record {
        ValuationRecord::from_raw(code, self)
    }

    fn defaulted_fields(record: &Self::Record) -> usize {
        record.defaulted_fields()
    }
}

impl RawRecord for RawAverage {
    type Record = AverageRecord;
    const DATASET: Dataset = Dataset::Average;

    fn raw_code(&self) -> &str {
        &self.code
    }

    fn into_record(self, code: StockCode) -> Self::Record {
        AverageRecord::from_raw(code, self)
    }

    fn defaulted_fields(record: &Self::Record) -> usize {
        record.defaulted_fields()
    }
}

impl RawRecord for RawDetail {
    type Record = DetailRecord;
    const DATASET: Dataset = Dataset::Detail;

    fn raw_code(&self) -> &str {
        &self.code
    }

    fn into_record(self, code: StockCode) -> Self::Record {
        DetailRecord::from_raw(code, self)
    }

    fn defaulted_fields(record: &Self::Record) -> usize {
        record.defaulted_fields()
    }
}

/// Something noteworthy, but not fatal, that happened while building a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A row had an empty or whitespace-only code and was dropped.
    BlankCode {
        /// Dataset the row came from.
        dataset: Dataset,
        /// Zero-based position of the row in the fetched list.
        position: usize,
    },
    /// A code appeared more than once; every occurrence after the first was dropped.
    DuplicateCode {
        /// Dataset the row came from.
        dataset: Dataset,
        /// The repeated code.
        code: StockCode,
        /// Zero-based position of the dropped row.
        position: usize,
    },
    /// The retrieval failed and the slot was committed as an empty list.
    FetchFailed {
        /// Dataset whose retrieval failed.
        dataset: Dataset,
        /// Error message from the last provider tried.
        error: String,
    },
    /// The retrieval failed and the previous snapshot was kept.
    StaleSnapshotKept {
        /// Dataset whose retrieval failed.
        dataset: Dataset,
        /// Error message from the last provider tried.
        error: String,
    },
}

impl Diagnostic {
    /// The dataset the diagnostic refers to.
    #[must_use]
    pub const fn dataset(&self) -> Dataset {
        match self {
            Self::BlankCode { dataset, .. }
            | Self::DuplicateCode { dataset, .. }
            | Self::FetchFailed { dataset, .. }
            | Self::StaleSnapshotKept { dataset, .. } => *dataset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankCode { dataset, position } => {
                write!(f, "{dataset}: row {position} has a blank code")
            }
            Self::DuplicateCode {
                dataset,
                code,
                position,
            } => write!(f, "{dataset}: row {position} repeats code {code}"),
            Self::FetchFailed { dataset, error } => {
                write!(f, "{dataset}: fetch failed, slot cleared ({error})")
            }
            Self::StaleSnapshotKept { dataset, error } => {
                write!(f, "{dataset}: fetch failed, previous snapshot kept ({error})")
            }
        }
    }
}

/// The outcome of normalizing one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Ingested<T> {
    /// Normalized records, in fetch order, one per distinct code.
    pub records: Vec<T>,
    /// Rows that were dropped, and why.
    pub diagnostics: Vec<Diagnostic>,
    /// Total numeric fields that fell back to their default.
    pub defaulted_fields: usize,
}

/// Normalizes a fetched dataset.
///
/// Order is preserved. The first row for each code wins.
pub fn ingest<R: RawRecord>(rows: Vec<R>) -> Ingested<R::Record> {
    let mut records = Vec::with_capacity(rows.len());
    let mut diagnostics = Vec::new();
    let mut defaulted_fields = 0;
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());

    for (position, row) in rows.into_iter().enumerate() {
        let Some(code) = StockCode::new(row.raw_code()) else {
            diagnostics.push(Diagnostic::BlankCode {
                dataset: R::DATASET,
                position,
            });
            continue;
        };

        if !seen.insert(code.as_str().to_string()) {
            diagnostics.push(Diagnostic::DuplicateCode {
                dataset: R::DATASET,
                code,
                position,
            });
            continue;
        }

        let record = row.into_record(code);
        defaulted_fields += R::defaulted_fields(&record);
        records.push(record);
    }

    Ingested {
        records,
        diagnostics,
        defaulted_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valuation(code: &str, closing: &str) -> RawValuation {
        RawValuation {
            code: code.to_string(),
            name: format!("name-{code}"),
            pb_ratio: "1.00".to_string(),
            closing_price: Some(closing.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_preserves_order() {
        let out = ingest(vec![valuation("2330", "605"), valuation("1101", "40")]);
        let codes: Vec<_> = out.records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["2330", "1101"]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_ingest_drops_blank_codes() {
        let out = ingest(vec![valuation("", "1"), valuation("2330", "605"), valuation(" ", "2")]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic::BlankCode {
                    dataset: Dataset::Valuation,
                    position: 0
                },
                Diagnostic::BlankCode {
                    dataset: Dataset::Valuation,
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn test_ingest_keeps_first_duplicate() {
        let out = ingest(vec![valuation("2330", "605"), valuation("2330", "999")]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].closing_price.value(), 605.0);
        assert!(matches!(
            &out.diagnostics[..],
            [Diagnostic::DuplicateCode { position: 1, .. }]
        ));
    }

    #[test]
    fn test_ingest_counts_defaulted_fields() {
        let rows = vec![RawAverage {
            code: "2330".to_string(),
            name: "台積電".to_string(),
            closing_price: Some("605.0".to_string()),
            monthly_average_price: Some("".to_string()),
        }];
        let out = ingest(rows);
        assert_eq!(out.defaulted_fields, 1);
        assert_eq!(out.records[0].closing_price.value(), 605.0);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::FetchFailed {
            dataset: Dataset::Detail,
            error: "timeout".to_string(),
        };
        assert_eq!(diag.dataset(), Dataset::Detail);
        assert_eq!(diag.to_string(), "detail: fetch failed, slot cleared (timeout)");
    }
}
