#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/twse-board/twse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Aggregated view of TWSE listed securities.
//!
//! This crate re-exports the core types and the record store, and provides a
//! [`StockBoard`] that refreshes the three datasets concurrently, joins them by
//! security code and serves the result in a requested order.
//!
//! # Features
//!
//! - `openapi` - TWSE OpenAPI provider (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use twse::{RecordStore, SortKey, StockBoard};
//!
//! #[tokio::main]
//! async fn main() -> twse::Result<()> {
//!     let board = StockBoard::new(Arc::new(RecordStore::new())).with_twse();
//!
//!     let report = board.refresh_all().await;
//!     println!("{} securities at revision {}", report.aggregate.len(), report.revision);
//!
//!     let frame = board.current_frame()?;
//!     println!("{frame}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use twse_core::*;

// Store
pub use twse_store::{Batch, DerivedAggregate, RecordStore, Snapshot};

// Providers
#[cfg(feature = "openapi")]
pub use twse_openapi::{TwseConfig, TwseProvider};

mod board;
mod report;

pub use board::{FailurePolicy, StockBoard};
pub use report::{FetchStatus, RefreshReport};
