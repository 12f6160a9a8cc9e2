//! In-memory record store.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, instrument};
use twse_core::{AggregateRecord, SortKey, aggregate, sort_records};

use crate::snapshot::{Batch, DerivedAggregate, Snapshot};

#[derive(Debug)]
struct StoreState {
    snapshot: Snapshot,
    aggregate: DerivedAggregate,
    order: Option<SortKey>,
}

/// Holds the latest snapshot of each dataset and the aggregate derived from them.
///
/// All writes go through [`replace`](Self::replace) or
/// [`replace_all`](Self::replace_all), which swap whole lists under a write lock
/// and bump the revision. Readers get a [`Snapshot`] that shares the lists, so
/// they never see a partially written slot. Ordering the aggregate happens under
/// the same write lock as committing it, so a commit and a reorder never undo
/// each other. Nothing awaits while holding the lock.
#[derive(Debug)]
pub struct RecordStore {
    state: RwLock<StoreState>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Creates a store with all slots empty and an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                snapshot: Snapshot::empty(),
                aggregate: DerivedAggregate::empty(),
                order: None,
            }),
        }
    }

    /// Replaces one slot. Returns the new revision.
    pub fn replace(&self, batch: Batch) -> u64 {
        self.replace_all([batch])
    }

    /// Replaces several slots in one step. Returns the new revision.
    ///
    /// Readers observe either none or all of the batches. An empty iterator
    /// leaves the store, and its revision, unchanged.
    #[instrument(skip_all)]
    pub fn replace_all(&self, batches: impl IntoIterator<Item = Batch>) -> u64 {
        let batches: Vec<Batch> = batches.into_iter().collect();
        let mut state = self.state.write();
        if batches.is_empty() {
            return state.snapshot.revision;
        }

        let now = Utc::now();
        for batch in batches {
            debug!(dataset = %batch.dataset(), count = batch.len(), "Replacing slot");
            state.snapshot.apply(batch, now);
        }
        state.snapshot.revision += 1;
        state.snapshot.revision
    }

    /// Returns the current contents of all three slots.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().snapshot.clone()
    }

    /// Returns the current store revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.read().snapshot.revision
    }

    /// Returns the last committed aggregate with its provenance.
    #[must_use]
    pub fn aggregate(&self) -> DerivedAggregate {
        self.state.read().aggregate.clone()
    }

    /// Returns the last committed aggregate entries.
    #[must_use]
    pub fn current_aggregate(&self) -> Arc<[AggregateRecord]> {
        Arc::clone(&self.state.read().aggregate.records)
    }

    /// Returns the sort applied to every committed aggregate, if any.
    #[must_use]
    pub fn active_order(&self) -> Option<SortKey> {
        self.state.read().order
    }

    /// Returns true if the stored aggregate was joined from the current slots.
    #[must_use]
    pub fn is_aggregate_current(&self) -> bool {
        let state = self.state.read();
        state.aggregate.revision == state.snapshot.revision
    }

    /// Commits an aggregate joined from the snapshot at `revision`, ordered by
    /// the active sort.
    ///
    /// An aggregate older than the one already stored is discarded, so a slow
    /// writer cannot overwrite a newer result. Returns whatever aggregate the
    /// store holds afterwards.
    pub fn commit_aggregate(
        &self,
        mut records: Vec<AggregateRecord>,
        revision: u64,
    ) -> Arc<[AggregateRecord]> {
        let mut state = self.state.write();
        if revision < state.aggregate.revision {
            debug!(
                revision,
                stored = state.aggregate.revision,
                "Discarding aggregate older than the stored one"
            );
            return Arc::clone(&state.aggregate.records);
        }

        let order = state.order;
        if let Some(key) = order {
            sort_records(&mut records, key);
        }
        debug!(revision, count = records.len(), ?order, "Committing aggregate");
        state.aggregate = DerivedAggregate {
            records: Arc::from(records),
            revision,
            order,
        };
        Arc::clone(&state.aggregate.records)
    }

    /// Makes `key` the active sort and reorders the stored aggregate by it.
    ///
    /// If a slot changed since the stored aggregate was joined, the join is
    /// re-run on the current slots first. Returns the reordered aggregate.
    #[instrument(skip(self))]
    pub fn sort_aggregate(&self, key: SortKey) -> Arc<[AggregateRecord]> {
        let mut state = self.state.write();
        let revision = state.snapshot.revision;

        let mut records = if state.aggregate.revision == revision {
            state.aggregate.records.to_vec()
        } else {
            debug!(
                stored = state.aggregate.revision,
                revision, "Slots changed since last aggregation, re-joining"
            );
            let snapshot = &state.snapshot;
            aggregate(&snapshot.valuations, &snapshot.averages, &snapshot.details)
        };
        sort_records(&mut records, key);

        state.order = Some(key);
        state.aggregate = DerivedAggregate {
            records: Arc::from(records),
            revision,
            order: Some(key),
        };
        Arc::clone(&state.aggregate.records)
    }
}
