//! Outcome of a refresh cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use twse_core::{AggregateRecord, Dataset, Diagnostic};

/// What happened to one dataset during a refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    /// The dataset was fetched and its slot replaced.
    Loaded {
        /// Records committed to the slot.
        records: usize,
        /// Rows dropped during ingest (blank or repeated codes).
        dropped: usize,
        /// Numeric fields that fell back to their default.
        defaulted_fields: usize,
    },
    /// The fetch failed and the slot was replaced with an empty list.
    Cleared {
        /// Error from the last provider tried.
        error: String,
    },
    /// The fetch failed and the previous snapshot was kept.
    KeptPrevious {
        /// Records still held from the previous snapshot.
        records: usize,
        /// Error from the last provider tried.
        error: String,
    },
}

impl FetchStatus {
    /// Returns true if fresh data was committed.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// The result of [`StockBoard::refresh_all`](crate::StockBoard::refresh_all).
#[derive(Clone, Debug)]
pub struct RefreshReport {
    /// The freshly joined aggregate, in the active sort order.
    pub aggregate: Arc<[AggregateRecord]>,
    /// One entry per dataset, in [`Dataset::ALL`] order.
    pub outcomes: Vec<(Dataset, FetchStatus)>,
    /// Everything that was dropped or degraded along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Store revision the aggregate was joined from.
    pub revision: u64,
    /// When the aggregate was committed.
    pub completed_at: DateTime<Utc>,
}

impl RefreshReport {
    /// Returns the status of `dataset`.
    #[must_use]
    pub fn status(&self, dataset: Dataset) -> Option<&FetchStatus> {
        self.outcomes
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, status)| status)
    }

    /// Returns true if every dataset was loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, status)| status.is_loaded())
    }

    /// Returns the datasets whose fetch failed.
    #[must_use]
    pub fn failed(&self) -> Vec<Dataset> {
        self.outcomes
            .iter()
            .filter(|(_, status)| !status.is_loaded())
            .map(|(dataset, _)| *dataset)
            .collect()
    }
}
