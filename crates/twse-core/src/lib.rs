#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/twse-board/twse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and operations for TWSE listed-security datasets.
//!
//! This crate provides the data-integrity half of the system:
//!
//! - [`normalize`](normalize::normalize) - Coerces blank or malformed numeric text to a default
//! - [`ingest`](ingest::ingest) - Turns decoded records into normalized ones, with diagnostics
//! - [`aggregate`](aggregate::aggregate) - Joins the three datasets by security code
//! - [`sort_records`](sort::sort_records) - Stable ordering by a closed set of [`SortKey`]s
//! - [`ValuationProvider`], [`AverageProvider`], [`DetailProvider`] - Dataset sources
//! - [`aggregate_frame`](frame::aggregate_frame) - Tabular export for display layers

/// Joining the three datasets into aggregate records.
pub mod aggregate;
/// Dataset identifiers.
pub mod dataset;
/// Error types.
pub mod error;
/// Tabular export of aggregate lists.
pub mod frame;
/// Raw-to-normalized record conversion with diagnostics.
pub mod ingest;
/// Numeric field normalization.
pub mod normalize;
/// Provider traits for retrieving the three datasets.
pub mod provider;
/// Decoded (not yet normalized) record shapes.
pub mod raw;
/// Sort directives and the sort engine.
pub mod sort;
/// Normalized record types.
pub mod types;

// Re-export commonly used items at crate root
pub use aggregate::aggregate;
pub use dataset::Dataset;
pub use error::{Result, TwseError};
pub use frame::aggregate_frame;
pub use ingest::{Diagnostic, Ingested, ingest};
pub use normalize::{NumericField, normalize};
pub use provider::{AverageProvider, DataProvider, DetailProvider, ValuationProvider};
pub use raw::{RawAverage, RawDetail, RawValuation};
pub use sort::{SortKey, sort_records, sorted};
pub use types::{AggregateRecord, AverageRecord, DetailRecord, StockCode, ValuationRecord};
