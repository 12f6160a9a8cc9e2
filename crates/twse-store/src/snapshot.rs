//! Snapshot and batch types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use twse_core::{
    AggregateRecord, AverageRecord, Dataset, DetailRecord, SortKey, ValuationRecord,
};

/// A replacement list for one dataset slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Batch {
    /// New contents of the valuation slot.
    Valuations(Vec<ValuationRecord>),
    /// New contents of the average price slot.
    Averages(Vec<AverageRecord>),
    /// New contents of the daily trading detail slot.
    Details(Vec<DetailRecord>),
}

impl Batch {
    /// An empty list for `dataset`.
    #[must_use]
    pub const fn empty(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Valuation => Self::Valuations(Vec::new()),
            Dataset::Average => Self::Averages(Vec::new()),
            Dataset::Detail => Self::Details(Vec::new()),
        }
    }

    /// The slot this batch replaces.
    #[must_use]
    pub const fn dataset(&self) -> Dataset {
        match self {
            Self::Valuations(_) => Dataset::Valuation,
            Self::Averages(_) => Dataset::Average,
            Self::Details(_) => Dataset::Detail,
        }
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Valuations(v) => v.len(),
            Self::Averages(v) => v.len(),
            Self::Details(v) => v.len(),
        }
    }

    /// Returns true if the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The three dataset slots at one revision.
///
/// Cloning is cheap: the lists are shared and never mutated in place.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Valuation slot.
    pub valuations: Arc<[ValuationRecord]>,
    /// Average price slot.
    pub averages: Arc<[AverageRecord]>,
    /// Daily trading detail slot.
    pub details: Arc<[DetailRecord]>,
    /// Store revision this snapshot was taken at.
    pub revision: u64,
    pub(crate) updated_at: [Option<DateTime<Utc>>; 3],
}

impl Snapshot {
    pub(crate) fn empty() -> Self {
        Self {
            valuations: Arc::from(Vec::new()),
            averages: Arc::from(Vec::new()),
            details: Arc::from(Vec::new()),
            revision: 0,
            updated_at: [None; 3],
        }
    }

    /// When `dataset` was last replaced, if ever.
    #[must_use]
    pub fn updated_at(&self, dataset: Dataset) -> Option<DateTime<Utc>> {
        self.updated_at[slot_index(dataset)]
    }

    /// Number of records in the slot for `dataset`.
    #[must_use]
    pub fn len(&self, dataset: Dataset) -> usize {
        match dataset {
            Dataset::Valuation => self.valuations.len(),
            Dataset::Average => self.averages.len(),
            Dataset::Detail => self.details.len(),
        }
    }

    pub(crate) fn apply(&mut self, batch: Batch, at: DateTime<Utc>) {
        self.updated_at[slot_index(batch.dataset())] = Some(at);
        match batch {
            Batch::Valuations(v) => self.valuations = Arc::from(v),
            Batch::Averages(v) => self.averages = Arc::from(v),
            Batch::Details(v) => self.details = Arc::from(v),
        }
    }
}

pub(crate) const fn slot_index(dataset: Dataset) -> usize {
    match dataset {
        Dataset::Valuation => 0,
        Dataset::Average => 1,
        Dataset::Detail => 2,
    }
}

/// The aggregate list last committed to the store.
#[derive(Clone, Debug)]
pub struct DerivedAggregate {
    /// Aggregate entries, in the order they are served.
    pub records: Arc<[AggregateRecord]>,
    /// Store revision of the snapshot the entries were joined from.
    pub revision: u64,
    /// Sort applied to the entries, if any.
    pub order: Option<SortKey>,
}

impl DerivedAggregate {
    pub(crate) fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            revision: 0,
            order: None,
        }
    }
}
