//! Refresh orchestration and ordering over a shared record store.

use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use polars::prelude::DataFrame;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use twse_core::{
    AggregateRecord, AverageProvider, DataProvider, Dataset, DetailProvider, Diagnostic, Ingested,
    Result, SortKey, TwseError, ValuationProvider, aggregate, aggregate_frame, ingest,
    ingest::RawRecord,
};
use twse_store::{Batch, RecordStore, Snapshot};

use crate::report::{FetchStatus, RefreshReport};

/// What to do with a slot whose fetch failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Commit an empty list, discarding the previous snapshot.
    #[default]
    ClearSlot,
    /// Keep serving the previous snapshot.
    KeepPrevious,
}

/// Fetches, joins and orders the three TWSE datasets.
///
/// The board owns no data itself: everything it fetches is committed to the
/// [`RecordStore`] it was created with, and every read goes through that store.
/// Several providers may be registered per dataset; they are tried in
/// registration order until one succeeds.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use twse::{RecordStore, SortKey, StockBoard};
///
/// let board = StockBoard::new(Arc::new(RecordStore::new())).with_twse();
/// let report = board.refresh_all().await;
/// println!("{} securities", report.aggregate.len());
///
/// let descending = board.sort_by(SortKey::CodeDescending);
/// ```
pub struct StockBoard {
    store: Arc<RecordStore>,
    valuation_providers: Vec<Arc<dyn ValuationProvider>>,
    average_providers: Vec<Arc<dyn AverageProvider>>,
    detail_providers: Vec<Arc<dyn DetailProvider>>,
    failure_policy: FailurePolicy,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for StockBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockBoard")
            .field(
                "valuation_providers",
                &self
                    .valuation_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "average_providers",
                &self
                    .average_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "detail_providers",
                &self
                    .detail_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("failure_policy", &self.failure_policy)
            .field("revision", &self.store.revision())
            .finish()
    }
}

impl StockBoard {
    /// Create a board with no providers, committing to `store`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            valuation_providers: Vec::new(),
            average_providers: Vec::new(),
            detail_providers: Vec::new(),
            failure_policy: FailurePolicy::default(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Set what happens to a slot whose fetch fails.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// The store this board commits to.
    #[must_use]
    pub const fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The active failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Register a valuation provider.
    pub fn register_valuation(&mut self, provider: Arc<dyn ValuationProvider>) {
        debug!(provider = provider.name(), "Registering valuation provider");
        self.valuation_providers.push(provider);
    }

    /// Register an average price provider.
    pub fn register_average(&mut self, provider: Arc<dyn AverageProvider>) {
        debug!(provider = provider.name(), "Registering average provider");
        self.average_providers.push(provider);
    }

    /// Register a daily trading detail provider.
    pub fn register_detail(&mut self, provider: Arc<dyn DetailProvider>) {
        debug!(provider = provider.name(), "Registering detail provider");
        self.detail_providers.push(provider);
    }

    /// Register a provider that serves all three datasets.
    #[must_use]
    pub fn with_provider<P>(mut self, provider: Arc<P>) -> Self
    where
        P: ValuationProvider + AverageProvider + DetailProvider + 'static,
    {
        self.register_valuation(provider.clone());
        self.register_average(provider.clone());
        self.register_detail(provider);
        self
    }

    /// Add the TWSE OpenAPI provider with default settings.
    #[cfg(feature = "openapi")]
    #[must_use]
    pub fn with_twse(self) -> Self {
        self.with_provider(Arc::new(twse_openapi::TwseProvider::new()))
    }

    /// Add the TWSE OpenAPI provider with explicit settings.
    #[cfg(feature = "openapi")]
    pub fn with_twse_config(self, config: twse_openapi::TwseConfig) -> Result<Self> {
        let provider = twse_openapi::TwseProvider::try_with_config(config)?;
        Ok(self.with_provider(Arc::new(provider)))
    }

    /// Fetch all three datasets, commit them and rebuild the aggregate.
    ///
    /// The fetches run concurrently and each result is normalized as soon as its
    /// fetch settles. The three slots are then committed together in a single
    /// store write once all fetches have settled, rather than one by one, so no
    /// reader joins a slot from this refresh against one from an earlier refresh.
    /// The join runs on that committed snapshot and is ordered by the active sort.
    ///
    /// A failed fetch never fails the refresh: it is handled according to the
    /// [`FailurePolicy`] and reported in the returned diagnostics. If another
    /// refresh is running, this one waits for it to finish first.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> RefreshReport {
        let _guard = self.refresh_lock.lock().await;
        self.run_refresh().await
    }

    /// Like [`refresh_all`](Self::refresh_all), but fails with
    /// [`TwseError::RefreshInProgress`] instead of waiting for a running refresh.
    #[instrument(skip(self))]
    pub async fn try_refresh_all(&self) -> Result<RefreshReport> {
        let _guard = self
            .refresh_lock
            .try_lock()
            .map_err(|_| TwseError::RefreshInProgress)?;
        Ok(self.run_refresh().await)
    }

    async fn run_refresh(&self) -> RefreshReport {
        let (valuations, averages, details) = tokio::join!(
            retrieve(Dataset::Valuation, &self.valuation_providers, |p| p
                .fetch_valuations()),
            retrieve(Dataset::Average, &self.average_providers, |p| p
                .fetch_averages()),
            retrieve(Dataset::Detail, &self.detail_providers, |p| p
                .fetch_details()),
        );

        let previous = self.store.snapshot();
        let mut cycle = Cycle::new(self.failure_policy, &previous);
        cycle.settle(Dataset::Valuation, valuations, Batch::Valuations);
        cycle.settle(Dataset::Average, averages, Batch::Averages);
        cycle.settle(Dataset::Detail, details, Batch::Details);
        let Cycle {
            batches,
            outcomes,
            diagnostics,
            ..
        } = cycle;

        self.store.replace_all(batches);

        let snapshot = self.store.snapshot();
        let records = aggregate(&snapshot.valuations, &snapshot.averages, &snapshot.details);
        let aggregate = self.store.commit_aggregate(records, snapshot.revision);

        info!(
            revision = snapshot.revision,
            count = aggregate.len(),
            diagnostics = diagnostics.len(),
            "Refresh complete"
        );

        RefreshReport {
            aggregate,
            outcomes,
            diagnostics,
            revision: snapshot.revision,
            completed_at: Utc::now(),
        }
    }

    /// Reorder the aggregate by `key` without fetching.
    ///
    /// If any slot changed since the stored aggregate was built, the join is
    /// re-run on the current slots first. The result becomes the stored
    /// aggregate and `key` becomes the order applied after later refreshes.
    /// The returned list is always ordered by `key`, even when a refresh
    /// commits concurrently.
    pub fn sort_by(&self, key: SortKey) -> Arc<[AggregateRecord]> {
        self.store.sort_aggregate(key)
    }

    /// Parse a sort directive and apply it.
    ///
    /// Fails with [`TwseError::UnknownSortKey`] for anything outside [`SortKey`].
    pub fn sort_by_name(&self, key: &str) -> Result<Arc<[AggregateRecord]>> {
        let key = key.parse::<SortKey>().inspect_err(|e| {
            warn!(error = %e, "Rejected sort directive");
        })?;
        Ok(self.sort_by(key))
    }

    /// The last committed aggregate.
    #[must_use]
    pub fn current_aggregate(&self) -> Arc<[AggregateRecord]> {
        self.store.current_aggregate()
    }

    /// The last committed aggregate as a [`DataFrame`].
    pub fn current_frame(&self) -> Result<DataFrame> {
        aggregate_frame(&self.current_aggregate())
    }
}

/// Try `providers` in order, normalizing the first successful result.
async fn retrieve<P, R>(
    dataset: Dataset,
    providers: &[Arc<P>],
    fetch: impl for<'p> Fn(&'p P) -> BoxFuture<'p, Result<Vec<R>>>,
) -> Result<Ingested<R::Record>>
where
    P: DataProvider + ?Sized,
    R: RawRecord,
{
    let mut last_error = None;
    for provider in providers {
        debug!(provider = provider.name(), dataset = %dataset, "Fetching dataset");

        match fetch(provider.as_ref()).await {
            Ok(rows) => {
                let ingested = ingest(rows);
                debug!(
                    provider = provider.name(),
                    dataset = %dataset,
                    count = ingested.records.len(),
                    dropped = ingested.diagnostics.len(),
                    "Dataset fetched"
                );
                return Ok(ingested);
            }
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    dataset = %dataset,
                    error = %e,
                    "Provider failed, trying next"
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(TwseError::ProviderNotConfigured(dataset)))
}

/// Collects the settled fetches of one refresh into store batches and a report.
struct Cycle<'a> {
    policy: FailurePolicy,
    previous: &'a Snapshot,
    batches: Vec<Batch>,
    outcomes: Vec<(Dataset, FetchStatus)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Cycle<'a> {
    fn new(policy: FailurePolicy, previous: &'a Snapshot) -> Self {
        Self {
            policy,
            previous,
            batches: Vec::with_capacity(Dataset::ALL.len()),
            outcomes: Vec::with_capacity(Dataset::ALL.len()),
            diagnostics: Vec::new(),
        }
    }

    fn settle<T>(
        &mut self,
        dataset: Dataset,
        result: Result<Ingested<T>>,
        into_batch: fn(Vec<T>) -> Batch,
    ) {
        match result {
            Ok(ingested) => {
                self.outcomes.push((
                    dataset,
                    FetchStatus::Loaded {
                        records: ingested.records.len(),
                        dropped: ingested.diagnostics.len(),
                        defaulted_fields: ingested.defaulted_fields,
                    },
                ));
                self.diagnostics.extend(ingested.diagnostics);
                self.batches.push(into_batch(ingested.records));
            }
            Err(e) => {
                let error = e.to_string();
                match self.policy {
                    FailurePolicy::ClearSlot => {
                        warn!(dataset = %dataset, error = %error, "Fetch failed, clearing slot");
                        self.batches.push(Batch::empty(dataset));
                        self.diagnostics.push(Diagnostic::FetchFailed {
                            dataset,
                            error: error.clone(),
                        });
                        self.outcomes.push((dataset, FetchStatus::Cleared { error }));
                    }
                    FailurePolicy::KeepPrevious => {
                        warn!(dataset = %dataset, error = %error, "Fetch failed, keeping previous snapshot");
                        self.diagnostics.push(Diagnostic::StaleSnapshotKept {
                            dataset,
                            error: error.clone(),
                        });
                        self.outcomes.push((
                            dataset,
                            FetchStatus::KeptPrevious {
                                records: self.previous.len(dataset),
                                error,
                            },
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;
    use twse_core::{RawAverage, RawDetail, RawValuation};

    fn raw_valuation(code: &str) -> RawValuation {
        RawValuation {
            code: code.to_string(),
            name: format!("name-{code}"),
            pb_ratio: "1.00".to_string(),
            dividend_yield: Some("3.5".to_string()),
            ..Default::default()
        }
    }

    fn raw_average(code: &str, closing: &str) -> RawAverage {
        RawAverage {
            code: code.to_string(),
            name: format!("name-{code}"),
            closing_price: Some(closing.to_string()),
            monthly_average_price: None,
        }
    }

    fn raw_detail(code: &str) -> RawDetail {
        RawDetail {
            code: code.to_string(),
            name: format!("name-{code}"),
            trade_volume: Some("1000".to_string()),
            change: Some("0.5".to_string()),
            ..Default::default()
        }
    }

    /// Serves fixed rows; `None` makes that dataset fail.
    #[derive(Debug, Default)]
    struct StaticProvider {
        valuations: Option<Vec<RawValuation>>,
        averages: Option<Vec<RawAverage>>,
        details: Option<Vec<RawDetail>>,
    }

    impl StaticProvider {
        fn new(
            valuations: Vec<RawValuation>,
            averages: Vec<RawAverage>,
            details: Vec<RawDetail>,
        ) -> Self {
            Self {
                valuations: Some(valuations),
                averages: Some(averages),
                details: Some(details),
            }
        }
    }

    fn served<T: Clone>(rows: &Option<Vec<T>>, dataset: Dataset) -> Result<Vec<T>> {
        rows.clone()
            .ok_or_else(|| TwseError::Network(format!("{dataset} unreachable")))
    }

    impl DataProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn description(&self) -> &str {
            "fixed rows for tests"
        }

        fn datasets(&self) -> &[Dataset] {
            &Dataset::ALL
        }
    }

    #[async_trait]
    impl ValuationProvider for StaticProvider {
        async fn fetch_valuations(&self) -> Result<Vec<RawValuation>> {
            served(&self.valuations, Dataset::Valuation)
        }
    }

    #[async_trait]
    impl AverageProvider for StaticProvider {
        async fn fetch_averages(&self) -> Result<Vec<RawAverage>> {
            served(&self.averages, Dataset::Average)
        }
    }

    #[async_trait]
    impl DetailProvider for StaticProvider {
        async fn fetch_details(&self) -> Result<Vec<RawDetail>> {
            served(&self.details, Dataset::Detail)
        }
    }

    /// Blocks its valuation fetch until released.
    #[derive(Debug, Default)]
    struct GatedProvider {
        started: Notify,
        release: Notify,
    }

    impl DataProvider for GatedProvider {
        fn name(&self) -> &str {
            "gated"
        }

        fn description(&self) -> &str {
            "waits for a signal before answering"
        }

        fn datasets(&self) -> &[Dataset] {
            &[Dataset::Valuation]
        }
    }

    #[async_trait]
    impl ValuationProvider for GatedProvider {
        async fn fetch_valuations(&self) -> Result<Vec<RawValuation>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![raw_valuation("2330")])
        }
    }

    fn board(provider: StaticProvider) -> StockBoard {
        StockBoard::new(Arc::new(RecordStore::new())).with_provider(Arc::new(provider))
    }

    fn codes(records: &[AggregateRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code().as_str()).collect()
    }

    #[tokio::test]
    async fn test_refresh_joins_partial_partners() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![raw_average("2330", "605.0")],
            vec![],
        ));

        let report = board.refresh_all().await;

        assert_eq!(report.aggregate.len(), 1);
        let entry = &report.aggregate[0];
        assert_eq!(entry.average.as_ref().unwrap().closing_price.value(), 605.0);
        assert!(entry.detail.is_none());
        assert!(report.is_complete());
        assert!(report.diagnostics.is_empty());
        assert_eq!(board.current_aggregate(), report.aggregate);
    }

    #[tokio::test]
    async fn test_failed_dataset_degrades_to_absent_partners() {
        let board = board(StaticProvider {
            valuations: Some(vec![raw_valuation("1101"), raw_valuation("2330")]),
            averages: None,
            details: Some(vec![raw_detail("2330")]),
        });

        let report = board.refresh_all().await;

        assert_eq!(report.aggregate.len(), 2);
        assert!(report.aggregate.iter().all(|r| r.average.is_none()));
        assert!(report.aggregate[1].detail.is_some());
        assert_eq!(report.failed(), vec![Dataset::Average]);
        assert!(matches!(
            report.status(Dataset::Average),
            Some(FetchStatus::Cleared { .. })
        ));
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::FetchFailed {
                dataset: Dataset::Average,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_failed_valuation_yields_empty_aggregate() {
        let board = board(StaticProvider {
            valuations: None,
            averages: Some(vec![raw_average("2330", "1")]),
            details: Some(vec![raw_detail("2330")]),
        });

        let report = board.refresh_all().await;
        assert!(report.aggregate.is_empty());
        assert_eq!(board.store().snapshot().averages.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_slot_discards_previous_snapshot() {
        let store = Arc::new(RecordStore::new());
        let good = StockBoard::new(store.clone()).with_provider(Arc::new(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![raw_average("2330", "605")],
            vec![],
        )));
        good.refresh_all().await;

        let flaky = StockBoard::new(store.clone()).with_provider(Arc::new(StaticProvider {
            valuations: Some(vec![raw_valuation("2330")]),
            averages: None,
            details: Some(vec![]),
        }));
        let report = flaky.refresh_all().await;

        assert!(report.aggregate[0].average.is_none());
        assert!(store.snapshot().averages.is_empty());
    }

    #[tokio::test]
    async fn test_keep_previous_serves_stale_snapshot() {
        let store = Arc::new(RecordStore::new());
        let good = StockBoard::new(store.clone()).with_provider(Arc::new(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![raw_average("2330", "605")],
            vec![],
        )));
        good.refresh_all().await;

        let flaky = StockBoard::new(store.clone())
            .with_failure_policy(FailurePolicy::KeepPrevious)
            .with_provider(Arc::new(StaticProvider {
                valuations: Some(vec![raw_valuation("2330"), raw_valuation("1101")]),
                averages: None,
                details: Some(vec![]),
            }));
        let report = flaky.refresh_all().await;

        assert_eq!(report.aggregate.len(), 2);
        assert_eq!(
            report.aggregate[0].average.as_ref().unwrap().closing_price.value(),
            605.0
        );
        assert_eq!(
            report.status(Dataset::Average),
            Some(&FetchStatus::KeptPrevious {
                records: 1,
                error: "Network error: average unreachable".to_string(),
            })
        );
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::StaleSnapshotKept { .. }]
        ));
    }

    #[tokio::test]
    async fn test_missing_providers_settle_as_failed() {
        let board = StockBoard::new(Arc::new(RecordStore::new()));
        let report = board.refresh_all().await;

        assert!(report.aggregate.is_empty());
        assert_eq!(report.failed(), Dataset::ALL.to_vec());
        assert_eq!(
            report.status(Dataset::Detail),
            Some(&FetchStatus::Cleared {
                error: "Provider not configured for detail".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let mut board = StockBoard::new(Arc::new(RecordStore::new()));
        board.register_valuation(Arc::new(StaticProvider::default()));
        board.register_valuation(Arc::new(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![],
            vec![],
        )));

        let report = board.refresh_all().await;

        assert_eq!(codes(&report.aggregate), vec!["2330"]);
        assert!(report.status(Dataset::Valuation).unwrap().is_loaded());
        assert!(!report.status(Dataset::Average).unwrap().is_loaded());
    }

    #[tokio::test]
    async fn test_ingest_diagnostics_are_reported() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("2330"), raw_valuation(""), raw_valuation("2330")],
            vec![],
            vec![],
        ));

        let report = board.refresh_all().await;

        assert_eq!(report.aggregate.len(), 1);
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(
            report.status(Dataset::Valuation),
            Some(&FetchStatus::Loaded {
                records: 1,
                dropped: 2,
                defaulted_fields: 4,
            })
        );
    }

    #[tokio::test]
    async fn test_sort_reorders_without_fetch() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("A"), raw_valuation("B")],
            vec![],
            vec![],
        ));
        board.refresh_all().await;
        let revision = board.store().revision();

        let sorted = board.sort_by(SortKey::CodeDescending);

        assert_eq!(codes(&sorted), vec!["B", "A"]);
        assert_eq!(codes(&board.current_aggregate()), vec!["B", "A"]);
        assert_eq!(board.store().revision(), revision);
        assert_eq!(board.store().active_order(), Some(SortKey::CodeDescending));
    }

    #[tokio::test]
    async fn test_refresh_commits_all_slots_in_one_write() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![raw_average("2330", "605")],
            vec![raw_detail("2330")],
        ));

        let report = board.refresh_all().await;
        let snapshot = board.store().snapshot();

        assert_eq!(report.revision, 1);
        assert_eq!(snapshot.revision, 1);
        let stamps: Vec<_> = Dataset::ALL
            .iter()
            .map(|d| snapshot.updated_at(*d))
            .collect();
        assert!(stamps[0].is_some());
        assert!(stamps.iter().all(|t| *t == stamps[0]));
    }

    #[tokio::test]
    async fn test_refresh_keeps_active_order() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("1"), raw_valuation("3"), raw_valuation("2")],
            vec![],
            vec![],
        ));
        board.refresh_all().await;
        board.sort_by(SortKey::CodeDescending);

        let report = board.refresh_all().await;
        assert_eq!(codes(&report.aggregate), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_before_any_fetch_is_empty() {
        let board = StockBoard::new(Arc::new(RecordStore::new()));
        assert!(board.sort_by(SortKey::CodeAscending).is_empty());
    }

    #[test]
    fn test_sort_rejoins_after_slot_change() {
        use twse_core::{AverageRecord, StockCode, ValuationRecord};

        let store = Arc::new(RecordStore::new());
        let board = StockBoard::new(store.clone());
        let code = StockCode::new("2330").unwrap();

        store.replace(Batch::Valuations(vec![ValuationRecord::new(
            code.clone(),
            "台積電",
            "6.11",
        )]));
        assert_eq!(board.sort_by(SortKey::CodeAscending).len(), 1);

        store.replace(Batch::Averages(vec![AverageRecord::new(
            code, "台積電", 605.0, 598.0,
        )]));
        let sorted = board.sort_by(SortKey::CodeAscending);

        assert_eq!(sorted[0].average.as_ref().unwrap().closing_price.value(), 605.0);
        assert!(store.is_aggregate_current());
    }

    #[test]
    fn test_unknown_sort_directive_is_rejected() {
        let board = StockBoard::new(Arc::new(RecordStore::new()));
        let err = board.sort_by_name("PriceDescending").unwrap_err();

        assert!(matches!(err, TwseError::UnknownSortKey(_)));
        assert!(board.store().active_order().is_none());
        assert!(board.sort_by_name("CODE_DESC").is_ok());
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_rejected() {
        let gate = Arc::new(GatedProvider::default());
        let mut board = StockBoard::new(Arc::new(RecordStore::new()));
        board.register_valuation(gate.clone());
        let board = Arc::new(board);

        let running = tokio::spawn({
            let board = board.clone();
            async move { board.refresh_all().await }
        });
        gate.started.notified().await;

        assert!(matches!(
            board.try_refresh_all().await,
            Err(TwseError::RefreshInProgress)
        ));

        gate.release.notify_one();
        let report = running.await.unwrap();
        assert_eq!(codes(&report.aggregate), vec!["2330"]);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_all_is_queued() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("2330")],
            vec![raw_average("2330", "605")],
            vec![raw_detail("2330")],
        ));

        let (first, second) = tokio::join!(board.refresh_all(), board.refresh_all());

        assert_eq!(first.revision + 1, second.revision);
        assert_eq!(first.aggregate, second.aggregate);
    }

    #[tokio::test]
    async fn test_current_frame() {
        let board = board(StaticProvider::new(
            vec![raw_valuation("2330"), raw_valuation("1101")],
            vec![raw_average("2330", "605")],
            vec![],
        ));
        board.refresh_all().await;

        let df = board.current_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("average_closing_price").unwrap().null_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sort_stays_ordered_during_refreshes() {
        let board = Arc::new(board(StaticProvider::new(
            ["3", "1", "5", "2", "4"].map(raw_valuation).to_vec(),
            vec![],
            vec![],
        )));
        board.refresh_all().await;

        let refresher = tokio::spawn({
            let board = board.clone();
            async move {
                for _ in 0..200 {
                    board.refresh_all().await;
                }
            }
        });
        let sorter = tokio::task::spawn_blocking({
            let board = board.clone();
            move || {
                let mut misordered = 0;
                for i in 0..20_000 {
                    let (key, expected) = if i % 2 == 0 {
                        (SortKey::CodeAscending, ["1", "2", "3", "4", "5"])
                    } else {
                        (SortKey::CodeDescending, ["5", "4", "3", "2", "1"])
                    };
                    if codes(&board.sort_by(key)) != expected {
                        misordered += 1;
                    }
                }
                misordered
            }
        });

        refresher.await.unwrap();
        assert_eq!(sorter.await.unwrap(), 0);

        assert_eq!(board.store().active_order(), Some(SortKey::CodeDescending));
        assert_eq!(codes(&board.current_aggregate()), vec!["5", "4", "3", "2", "1"]);

        let report = board.refresh_all().await;
        assert_eq!(codes(&report.aggregate), vec!["5", "4", "3", "2", "1"]);
    }
}
