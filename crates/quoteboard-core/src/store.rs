//! Instrument data-state manager.
//!
//! [`InstrumentStore`] owns the active tab, the search term and the current
//! selection, and resolves summaries and histories through two
//! [`FetchCache`]s. Presentation code reads its state and calls its
//! operations; nothing else mutates it.
//!
//! ## Stale results
//!
//! Every selection bumps a generation counter and tags its two fetches with
//! it. A fetch result is applied only while its generation is still current,
//! so a slow response for an instrument the user already left is dropped
//! instead of overwriting the newer selection.
//!
//! ```text
//! select(A) ── gen 1 ── fetch A ─────────────────────────▶ discarded
//! select(B) ─────────── gen 2 ── fetch B ──▶ applied
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::FetchCache;
use crate::catalog::{load_catalog, Catalog};
use crate::config::StoreConfig;
use crate::data_source::{Endpoint, MarketDataSource, SourceError};
use crate::history::{window, HistoryRange};
use crate::search::filter_instruments;
use crate::{
    ConstituentInstrument, HistoryPoint, Instrument, InstrumentDetail, InstrumentId, MarketInfo,
    Tab, ValidationError,
};

/// Where the selection currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum SelectionPhase {
    NoSelection,
    /// Selected, with a summary or history fetch still outstanding.
    Loading(InstrumentId),
    /// Selected and fully resolved, possibly to empty data on failure.
    Selected(InstrumentId),
}

/// Result of a selection-changing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// The requested instrument was already selected; nothing happened.
    Unchanged,
    /// The selection was cleared.
    Cleared,
    /// Both fetches resolved and were applied.
    Resolved,
    /// Another selection took over before this one resolved.
    Superseded,
}

/// Number of populated entries per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub summaries: usize,
    pub histories: usize,
}

/// Point-in-time copy of everything presentation code renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub active_tab: Tab,
    pub tabs: Vec<Tab>,
    pub market_info: Option<MarketInfo>,
    pub search_term: String,
    pub instruments: Vec<Instrument>,
    pub selected_id: Option<InstrumentId>,
    pub phase: SelectionPhase,
    pub detail: Option<InstrumentDetail>,
    pub history: Vec<HistoryPoint>,
    pub history_range: HistoryRange,
}

#[derive(Debug)]
struct Selection {
    generation: u64,
    id: Option<InstrumentId>,
    detail: Option<Arc<InstrumentDetail>>,
    history: Arc<Vec<HistoryPoint>>,
    detail_pending: bool,
    history_pending: bool,
    history_range: HistoryRange,
}

impl Selection {
    fn empty() -> Self {
        Self {
            generation: 0,
            id: None,
            detail: None,
            history: Arc::new(Vec::new()),
            detail_pending: false,
            history_pending: false,
            history_range: HistoryRange::default(),
        }
    }

    /// Switch to `id` (or to nothing), dropping whatever belonged to the
    /// previous selection. Returns the new generation.
    fn reset(&mut self, id: Option<InstrumentId>) -> u64 {
        let pending = id.is_some();
        self.generation += 1;
        self.id = id;
        self.detail = None;
        self.history = Arc::new(Vec::new());
        self.detail_pending = pending;
        self.history_pending = pending;
        self.history_range = HistoryRange::default();
        self.generation
    }

    fn is_current(&self, generation: u64, id: &InstrumentId) -> bool {
        self.generation == generation && self.id.as_ref() == Some(id)
    }

    fn phase(&self) -> SelectionPhase {
        match &self.id {
            None => SelectionPhase::NoSelection,
            Some(id) if self.detail_pending || self.history_pending => SelectionPhase::Loading(id.clone()),
            Some(id) => SelectionPhase::Selected(id.clone()),
        }
    }
}

#[derive(Debug)]
struct StoreState {
    active_tab: Tab,
    search_term: String,
    instruments: Vec<Instrument>,
    market_info: Option<MarketInfo>,
    selection: Selection,
}

struct StoreInner {
    source: Arc<dyn MarketDataSource>,
    config: StoreConfig,
    catalog: OnceCell<Arc<Catalog>>,
    summaries: FetchCache<InstrumentDetail>,
    histories: FetchCache<Vec<HistoryPoint>>,
    state: Mutex<StoreState>,
}

/// Explicitly constructed state container for tabs, search and selection.
///
/// Clones are cheap handles onto the same state and caches.
#[derive(Clone)]
pub struct InstrumentStore {
    inner: Arc<StoreInner>,
}

impl InstrumentStore {
    pub fn new(source: Arc<dyn MarketDataSource>, config: StoreConfig) -> Self {
        let state = StoreState {
            active_tab: config.default_tab.clone(),
            search_term: String::new(),
            instruments: Vec::new(),
            market_info: None,
            selection: Selection::empty(),
        };

        Self {
            inner: Arc::new(StoreInner {
                source,
                summaries: FetchCache::new(Endpoint::Summary, config.fetch_timeout),
                histories: FetchCache::new(Endpoint::History, config.fetch_timeout),
                config,
                catalog: OnceCell::new(),
                state: Mutex::new(state),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .expect("store state lock is not poisoned")
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Activate the configured default tab, loading the catalog on the way.
    pub async fn bootstrap(&self) -> SelectionOutcome {
        let tab = self.inner.config.default_tab.clone();
        self.set_active_tab(tab).await
    }

    /// Load the catalog once, then refresh the active tab's list from it.
    ///
    /// Returns the number of constituents. On failure the raw catalog stays
    /// empty, the active list is emptied and a later call tries again.
    pub async fn load_catalog(&self) -> Result<usize, SourceError> {
        let result = self
            .inner
            .catalog
            .get_or_try_init(|| async {
                load_catalog(self.inner.source.as_ref()).await.map(Arc::new)
            })
            .await;

        let mut state = self.state();
        match result {
            Ok(catalog) => {
                state.market_info = Some(catalog.market_info.clone());
                state.instruments = derive_instruments(Some(catalog), &state.active_tab);
                Ok(catalog.len())
            }
            Err(err) => {
                state.market_info = None;
                state.instruments = Vec::new();
                Err(err)
            }
        }
    }

    /// Activate `tab` and select its first instrument.
    ///
    /// When the tab has no instruments the tab name itself is selected as an
    /// instrument id, matching how index tabs double as instruments.
    pub async fn set_active_tab(&self, tab: Tab) -> SelectionOutcome {
        if self.inner.catalog.get().is_none() {
            // A failed load is already logged and leaves the list empty.
            let _ = self.load_catalog().await;
        }

        let first = {
            let mut state = self.state();
            state.instruments = derive_instruments(self.inner.catalog.get(), &tab);
            info!(tab = %tab, instruments = state.instruments.len(), "active tab changed");
            state.active_tab = tab.clone();
            state.instruments.first().map(|instrument| instrument.id.clone())
        };

        let target = match first {
            Some(id) => Some(id),
            None => match tab.fallback_instrument() {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(tab = %tab, error = %err, "tab name is not a usable instrument id");
                    None
                }
            },
        };

        self.select_instrument(target).await
    }

    /// Store the free-text query applied by [`InstrumentStore::instruments`].
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state().search_term = term.into();
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Re-selecting the current instrument is a no-op. Otherwise the previous
    /// detail and history are dropped and both are fetched concurrently
    /// through the caches. Fetch failures leave the slot empty.
    pub async fn select_instrument(&self, id: Option<InstrumentId>) -> SelectionOutcome {
        let (generation, id) = {
            let mut state = self.state();
            if state.selection.id == id {
                return SelectionOutcome::Unchanged;
            }

            let generation = state.selection.reset(id.clone());
            match id {
                Some(id) => (generation, id),
                None => {
                    info!("selection cleared");
                    return SelectionOutcome::Cleared;
                }
            }
        };

        info!(id = %id, generation, "instrument selected");

        let summary = async {
            let source = Arc::clone(&self.inner.source);
            let result = self
                .inner
                .summaries
                .get_or_fetch(&id, |key| async move { source.summary(&key).await })
                .await;
            self.apply_detail(generation, &id, result)
        };

        let history = async {
            let source = Arc::clone(&self.inner.source);
            let result = self
                .inner
                .histories
                .get_or_fetch(&id, |key| async move { source.history(&key).await })
                .await;
            self.apply_history(generation, &id, result)
        };

        let (detail_applied, history_applied) = tokio::join!(summary, history);
        if detail_applied && history_applied {
            SelectionOutcome::Resolved
        } else {
            SelectionOutcome::Superseded
        }
    }

    /// Parse `code` and select it.
    pub async fn select_by_code(&self, code: &str) -> Result<SelectionOutcome, ValidationError> {
        let id = InstrumentId::parse(code)?;
        Ok(self.select_instrument(Some(id)).await)
    }

    /// Run [`InstrumentStore::select_instrument`] on the runtime without
    /// waiting for it.
    pub fn spawn_select(&self, id: Option<InstrumentId>) -> JoinHandle<SelectionOutcome> {
        let store = self.clone();
        tokio::spawn(async move { store.select_instrument(id).await })
    }

    pub fn set_history_range(&self, range: HistoryRange) {
        self.state().selection.history_range = range;
    }

    fn apply_detail(
        &self,
        generation: u64,
        id: &InstrumentId,
        result: Result<Arc<InstrumentDetail>, SourceError>,
    ) -> bool {
        let mut state = self.state();
        if !state.selection.is_current(generation, id) {
            debug!(id = %id, generation, "discarding stale summary");
            return false;
        }

        state.selection.detail_pending = false;
        state.selection.detail = match result {
            Ok(detail) => Some(detail),
            Err(err) => {
                warn!(id = %id, code = err.code(), error = %err, "summary unavailable");
                None
            }
        };
        true
    }

    fn apply_history(
        &self,
        generation: u64,
        id: &InstrumentId,
        result: Result<Arc<Vec<HistoryPoint>>, SourceError>,
    ) -> bool {
        let mut state = self.state();
        if !state.selection.is_current(generation, id) {
            debug!(id = %id, generation, "discarding stale history");
            return false;
        }

        state.selection.history_pending = false;
        state.selection.history = match result {
            Ok(history) => history,
            Err(err) => {
                warn!(id = %id, code = err.code(), error = %err, "history unavailable");
                Arc::new(Vec::new())
            }
        };
        true
    }

    // ------------------------------------------------------------------
    // Read-only state
    // ------------------------------------------------------------------

    pub fn active_tab(&self) -> Tab {
        self.state().active_tab.clone()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.inner.config.tabs
    }

    pub fn market_info(&self) -> Option<MarketInfo> {
        self.state().market_info.clone()
    }

    /// Raw constituents of the loaded catalog; empty until a load succeeds.
    pub fn raw_constituents(&self) -> Vec<ConstituentInstrument> {
        self.inner
            .catalog
            .get()
            .map(|catalog| catalog.constituents.clone())
            .unwrap_or_default()
    }

    pub fn search_term(&self) -> String {
        self.state().search_term.clone()
    }

    /// The active tab's instruments, filtered by the search term.
    pub fn instruments(&self) -> Vec<Instrument> {
        let state = self.state();
        filter_instruments(&state.instruments, &state.search_term)
    }

    /// The active tab's instruments, ignoring the search term.
    pub fn all_instruments(&self) -> Vec<Instrument> {
        self.state().instruments.clone()
    }

    pub fn selected_id(&self) -> Option<InstrumentId> {
        self.state().selection.id.clone()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state().selection.phase()
    }

    pub fn detail(&self) -> Option<Arc<InstrumentDetail>> {
        self.state().selection.detail.clone()
    }

    pub fn history(&self) -> Arc<Vec<HistoryPoint>> {
        Arc::clone(&self.state().selection.history)
    }

    pub fn history_range(&self) -> HistoryRange {
        self.state().selection.history_range
    }

    /// History points inside the current [`HistoryRange`].
    pub fn history_in_range(&self) -> Vec<HistoryPoint> {
        let state = self.state();
        window(&state.selection.history, state.selection.history_range).to_vec()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            summaries: self.inner.summaries.len().await,
            histories: self.inner.histories.len().await,
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state();
        StoreSnapshot {
            active_tab: state.active_tab.clone(),
            tabs: self.inner.config.tabs.clone(),
            market_info: state.market_info.clone(),
            search_term: state.search_term.clone(),
            instruments: filter_instruments(&state.instruments, &state.search_term),
            selected_id: state.selection.id.clone(),
            phase: state.selection.phase(),
            detail: state.selection.detail.as_deref().cloned(),
            history: state.selection.history.as_ref().clone(),
            history_range: state.selection.history_range,
        }
    }
}

/// List shown for `tab`; unknown tabs and a missing catalog yield nothing.
fn derive_instruments(catalog: Option<&Arc<Catalog>>, tab: &Tab) -> Vec<Instrument> {
    let result = match catalog {
        Some(catalog) => catalog.instruments_for_tab(tab),
        None => Err(SourceError::unknown_tab(tab)),
    };

    result.unwrap_or_else(|err| {
        warn!(tab = %tab, code = err.code(), "{}", err.message());
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::MemorySource;

    const CATALOG: &str = r#"{"success": true, "data": {
        "info": {"name": "IPSA", "countryName": "Chile"},
        "constituents": [
            {"codeInstrument": "CHILE", "name": "Banco de Chile", "shortName": "CHILE", "lastPrice": 110.0, "pctDay": 0.4},
            {"codeInstrument": "SQM-B", "name": "Sociedad Quimica y Minera", "shortName": "SQM-B", "lastPrice": 41500.0, "pctDay": -1.2}
        ]
    }}"#;

    fn summary(name: &str) -> String {
        format!(r#"{{"success": true, "data": {{"info": {{"name": "{name}"}}, "price": {{"lastPrice": 1.0}}}}}}"#)
    }

    fn history(ts: i64) -> String {
        format!(
            r#"{{"success": true, "data": {{"chart": [
                {{"datetimeLastPrice": "x", "datetimeLastPriceTs": {ts}, "lastPrice": 1.0}}
            ]}}}}"#
        )
    }

    fn id(raw: &str) -> InstrumentId {
        InstrumentId::parse(raw).expect("id")
    }

    fn store_with(source: MemorySource) -> (InstrumentStore, Arc<MemorySource>) {
        let source = Arc::new(source);
        let store = InstrumentStore::new(source.clone(), StoreConfig::default());
        (store, source)
    }

    #[tokio::test]
    async fn starts_with_no_selection() {
        let (store, _) = store_with(MemorySource::new());
        assert_eq!(store.phase(), SelectionPhase::NoSelection);
        assert!(store.instruments().is_empty());
        assert_eq!(store.active_tab().as_str(), "IPSA");
    }

    #[tokio::test]
    async fn bootstrap_selects_first_constituent() {
        let (store, _) = store_with(
            MemorySource::new()
                .with_catalog(CATALOG)
                .with_summary("CHILE", summary("Banco de Chile"))
                .with_history("CHILE", history(10)),
        );

        assert_eq!(store.bootstrap().await, SelectionOutcome::Resolved);
        assert_eq!(store.selected_id(), Some(id("CHILE")));
        assert_eq!(store.phase(), SelectionPhase::Selected(id("CHILE")));
        assert_eq!(store.instruments().len(), 2);
        assert_eq!(store.market_info().map(|info| info.name), Some(String::from("IPSA")));
    }

    #[tokio::test]
    async fn catalog_is_loaded_once() {
        let (store, source) = store_with(MemorySource::new().with_catalog(CATALOG));

        assert_eq!(store.load_catalog().await.expect("catalog"), 2);
        assert_eq!(store.load_catalog().await.expect("catalog"), 2);
        store.set_active_tab(Tab::parse("IPSA").expect("tab")).await;

        assert_eq!(source.catalog_fetches(), 1);
    }

    #[tokio::test]
    async fn failed_catalog_load_is_retried() {
        let (store, source) = store_with(MemorySource::new());

        assert!(store.load_catalog().await.is_err());
        assert!(store.load_catalog().await.is_err());
        assert_eq!(source.catalog_fetches(), 2);
        assert!(store.raw_constituents().is_empty());
    }

    #[tokio::test]
    async fn new_selection_drops_previous_detail_while_loading() {
        let (store, _) = store_with(
            MemorySource::new()
                .with_summary("CHILE", summary("Banco de Chile"))
                .with_history("CHILE", history(10))
                .with_summary("SQM-B", summary("SQM"))
                .with_history("SQM-B", history(20))
                .with_latency("SQM-B", Duration::from_millis(100)),
        );

        store.select_instrument(Some(id("CHILE"))).await;
        assert!(store.detail().is_some());

        let pending = store.spawn_select(Some(id("SQM-B")));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.phase(), SelectionPhase::Loading(id("SQM-B")));
        assert!(store.detail().is_none());
        assert!(store.history().is_empty());

        assert_eq!(pending.await.expect("task"), SelectionOutcome::Resolved);
        assert_eq!(store.detail().map(|d| d.info.name.clone()), Some(String::from("SQM")));
    }

    #[tokio::test]
    async fn history_range_resets_on_selection_change() {
        let (store, _) = store_with(
            MemorySource::new()
                .with_summary("CHILE", summary("Banco de Chile"))
                .with_history("CHILE", history(10)),
        );

        store.set_history_range(HistoryRange::OneMonth);
        store.select_instrument(Some(id("CHILE"))).await;
        assert_eq!(store.history_range(), HistoryRange::OneYear);

        store.set_history_range(HistoryRange::OneDay);
        assert_eq!(store.history_in_range().len(), 1);
        store.select_instrument(None).await;
        assert_eq!(store.history_range(), HistoryRange::OneYear);
    }

    #[tokio::test]
    async fn search_term_filters_the_active_list() {
        let (store, _) = store_with(MemorySource::new().with_catalog(CATALOG));
        store.load_catalog().await.expect("catalog");

        store.set_search_term("quimica");
        let ids: Vec<String> = store.instruments().into_iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["SQM-B"]);
        assert_eq!(store.all_instruments().len(), 2);

        store.set_search_term("");
        assert_eq!(store.snapshot().instruments.len(), 2);
    }
}
