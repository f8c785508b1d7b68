use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::payload::{parse_catalog, parse_history, parse_summary};
use crate::{Catalog, HistoryPoint, InstrumentDetail, InstrumentId};

/// In-memory source holding raw JSON bodies.
///
/// Each instrument can be given an artificial latency, and every fetch is
/// counted so callers can assert how often the source was hit. Missing
/// entries behave like an unreadable store.
#[derive(Debug, Default)]
pub struct MemorySource {
    catalog: Option<String>,
    summaries: HashMap<String, String>,
    histories: HashMap<String, String>,
    latency: HashMap<String, Duration>,
    catalog_fetches: AtomicUsize,
    summary_fetches: Mutex<HashMap<String, usize>>,
    history_fetches: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, body: impl Into<String>) -> Self {
        self.catalog = Some(body.into());
        self
    }

    pub fn with_summary(mut self, id: &str, body: impl Into<String>) -> Self {
        self.summaries.insert(id.to_owned(), body.into());
        self
    }

    /// Register a history body; `id` is upper-cased like the history key.
    pub fn with_history(mut self, id: &str, body: impl Into<String>) -> Self {
        self.histories.insert(id.to_ascii_uppercase(), body.into());
        self
    }

    /// Delay every summary and history fetch for `id`.
    pub fn with_latency(mut self, id: &str, latency: Duration) -> Self {
        self.latency.insert(id.to_owned(), latency);
        self
    }

    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    pub fn summary_fetches(&self, id: &str) -> usize {
        count(&self.summary_fetches, id)
    }

    pub fn history_fetches(&self, id: &str) -> usize {
        count(&self.history_fetches, id)
    }

    async fn simulate_latency(&self, id: &InstrumentId) {
        if let Some(latency) = self.latency.get(id.as_str()) {
            tokio::time::sleep(*latency).await;
        }
    }
}

fn count(counter: &Mutex<HashMap<String, usize>>, id: &str) -> usize {
    counter
        .lock()
        .expect("fetch counter lock is not poisoned")
        .get(id)
        .copied()
        .unwrap_or(0)
}

fn record(counter: &Mutex<HashMap<String, usize>>, id: &InstrumentId) {
    *counter
        .lock()
        .expect("fetch counter lock is not poisoned")
        .entry(id.as_str().to_owned())
        .or_insert(0) += 1;
}

impl MarketDataSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn catalog<'a>(&'a self) -> SourceFuture<'a, Catalog> {
        Box::pin(async move {
            self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
            let body = self
                .catalog
                .as_deref()
                .ok_or_else(|| SourceError::unavailable("no catalog registered"))?;
            parse_catalog(body)
        })
    }

    fn summary<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, InstrumentDetail> {
        Box::pin(async move {
            record(&self.summary_fetches, id);
            self.simulate_latency(id).await;
            let body = self
                .summaries
                .get(id.as_str())
                .ok_or_else(|| SourceError::unavailable(format!("no summary registered for '{id}'")))?;
            parse_summary(id.as_str(), body)
        })
    }

    fn history<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, Vec<HistoryPoint>> {
        Box::pin(async move {
            record(&self.history_fetches, id);
            self.simulate_latency(id).await;
            let key = id.history_key();
            let body = self
                .histories
                .get(&key)
                .ok_or_else(|| SourceError::unavailable(format!("no history registered for '{key}'")))?;
            parse_history(&key, body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceErrorKind;

    #[tokio::test]
    async fn counts_fetches_per_instrument() {
        let source = MemorySource::new().with_summary(
            "CHILE",
            r#"{"success": true, "data": {"info": {"name": "Banco de Chile"}, "price": {}}}"#,
        );
        let id = InstrumentId::parse("CHILE").expect("id");

        source.summary(&id).await.expect("summary");
        source.summary(&id).await.expect("summary");

        assert_eq!(source.summary_fetches("CHILE"), 2);
        assert_eq!(source.history_fetches("CHILE"), 0);
    }

    #[tokio::test]
    async fn missing_entries_are_unavailable() {
        let source = MemorySource::new();
        let id = InstrumentId::parse("CHILE").expect("id");

        let err = source.history(&id).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable);
        let err = source.catalog().await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable);
        assert_eq!(source.catalog_fetches(), 1);
    }
}
