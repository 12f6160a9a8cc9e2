#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/twse-board/twse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Record store for TWSE dataset snapshots.
//!
//! - [`RecordStore`] - Holds the three dataset slots and the derived aggregate
//! - [`Snapshot`] - A consistent, immutable view of the three slots
//! - [`Batch`] - A replacement list for one slot

/// Snapshot and batch types.
pub mod snapshot;
/// The in-memory record store.
pub mod store;

pub use snapshot::{Batch, DerivedAggregate, Snapshot};
pub use store::RecordStore;
