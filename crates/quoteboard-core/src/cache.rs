//! Write-once, fetch-or-serve cache for per-instrument data.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::data_source::{Endpoint, SourceError};
use crate::InstrumentId;

type Slot<T> = Arc<OnceCell<Arc<T>>>;

#[derive(Debug)]
struct CacheInner<T> {
    slots: HashMap<InstrumentId, Slot<T>>,
}

impl<T> CacheInner<T> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    fn slot(&mut self, key: &InstrumentId) -> Slot<T> {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn get(&self, key: &InstrumentId) -> Option<Arc<T>> {
        self.slots.get(key).and_then(|slot| slot.get().cloned())
    }

    fn len(&self) -> usize {
        self.slots.values().filter(|slot| slot.initialized()).count()
    }
}

/// Per-key cache of fetched values.
///
/// - A populated key is served from memory and never fetched again.
/// - Concurrent lookups of the same missing key share one in-flight fetch.
/// - Failures (including timeouts) are not stored, so the next lookup retries.
///
/// Clones share the same storage.
#[derive(Debug)]
pub struct FetchCache<T> {
    endpoint: Endpoint,
    timeout: Option<Duration>,
    inner: Arc<Mutex<CacheInner<T>>>,
}

impl<T> Clone for FetchCache<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint,
            timeout: self.timeout,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FetchCache<T> {
    /// Create an empty cache for `endpoint`. `timeout` bounds every fetch;
    /// `None` lets a fetch run for as long as the source takes.
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>) -> Self {
        Self {
            endpoint,
            timeout,
            inner: Arc::new(Mutex::new(CacheInner::new())),
        }
    }

    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Return the cached value for `key`, or run `fetcher` and store its
    /// result.
    ///
    /// The timeout bounds the caller's whole wait, including time spent
    /// behind another caller's in-flight fetch for the same key.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error, or a
    /// [`TimedOut`](crate::SourceErrorKind::TimedOut) error when the timeout
    /// expires first. Nothing is cached in either case.
    pub async fn get_or_fetch<F, Fut>(&self, key: &InstrumentId, fetcher: F) -> Result<Arc<T>, SourceError>
    where
        F: FnOnce(InstrumentId) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let slot = {
            let mut inner = self.inner.lock().await;
            inner.slot(key)
        };

        if let Some(value) = slot.get() {
            debug!(endpoint = %self.endpoint, key = %key, "cache hit");
            return Ok(Arc::clone(value));
        }

        let endpoint = self.endpoint;
        let init = slot.get_or_try_init(|| async move {
            debug!(endpoint = %endpoint, key = %key, "cache miss, fetching");
            fetcher(key.clone()).await.map(Arc::new)
        });

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, init).await {
                Ok(result) => result.map(Arc::clone),
                Err(_) => Err(SourceError::timed_out(endpoint, key, limit.as_millis())),
            },
            None => init.await.map(Arc::clone),
        };

        if result.is_err() {
            self.evict_empty(key, &slot).await;
        }
        result
    }

    /// Drop `slot` from the map if it is still empty and nobody else holds it.
    async fn evict_empty(&self, key: &InstrumentId, slot: &Slot<T>) {
        let mut inner = self.inner.lock().await;
        let unused = inner.slots.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && !current.initialized() && Arc::strong_count(current) <= 2
        });
        if unused {
            inner.slots.remove(key);
        }
    }

    /// Cached value for `key`, without fetching.
    pub async fn get(&self, key: &InstrumentId) -> Option<Arc<T>> {
        let inner = self.inner.lock().await;
        inner.get(key)
    }

    pub async fn contains(&self, key: &InstrumentId) -> bool {
        self.get(key).await.is_some()
    }

    /// Number of populated entries.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn id(raw: &str) -> InstrumentId {
        InstrumentId::parse(raw).expect("id")
    }

    #[tokio::test]
    async fn test_cache_serves_second_lookup_from_memory() {
        let cache = FetchCache::<String>::new(Endpoint::Summary, None);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch(&id("CHILE"), |key| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(format!("detail-{key}")) }
            })
            .await
            .expect("first fetch");

        let second = cache
            .get_or_fetch(&id("CHILE"), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(String::from("refetched")) }
            })
            .await
            .expect("cached");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.as_str(), "detail-CHILE");
    }

    #[tokio::test]
    async fn test_cache_does_not_store_failures() {
        let cache = FetchCache::<String>::new(Endpoint::History, None);

        let err = cache
            .get_or_fetch(&id("CHILE"), |_| async move {
                Err(SourceError::unavailable("offline"))
            })
            .await
            .expect_err("must fail");
        assert_eq!(err.message(), "offline");
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_fetch(&id("CHILE"), |_| async move { Ok(String::from("ok")) })
            .await
            .expect("retry succeeds");
        assert_eq!(value.as_str(), "ok");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_coalesces_concurrent_fetches() {
        let cache = FetchCache::<String>::new(Endpoint::Summary, None);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = id("SQM-B");

        let fetch = |calls: Arc<AtomicUsize>| {
            move |key: InstrumentId| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(key.to_string())
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(&key, fetch(Arc::clone(&calls))),
            cache.get_or_fetch(&key, fetch(Arc::clone(&calls)))
        );

        let a = a.expect("first waiter");
        let b = b.expect("second waiter");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_cache_times_out_slow_fetch() {
        let cache = FetchCache::<String>::new(Endpoint::History, Some(Duration::from_millis(20)));

        let err = cache
            .get_or_fetch(&id("CHILE"), |_| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(String::from("late"))
            })
            .await
            .expect_err("must time out");

        assert_eq!(err.kind(), crate::SourceErrorKind::TimedOut);
        assert!(!cache.contains(&id("CHILE")).await);
    }

    #[tokio::test]
    async fn test_failed_keys_leave_no_slot_behind() {
        let cache = FetchCache::<String>::new(Endpoint::Summary, Some(Duration::from_millis(10)));

        for code in ["CHILE", "SQM-B"] {
            let _ = cache
                .get_or_fetch(&id(code), |_| async move {
                    Err::<String, _>(SourceError::unavailable("offline"))
                })
                .await;
        }
        let _ = cache
            .get_or_fetch(&id("CAP"), |_| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(String::from("late"))
            })
            .await;

        assert!(cache.inner.lock().await.slots.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_is_bounded_by_one_timeout() {
        let cache = FetchCache::<String>::new(Endpoint::History, Some(Duration::from_millis(50)));
        let key = id("CHILE");
        let slow = |_: InstrumentId| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::from("late"))
        };

        let started = tokio::time::Instant::now();
        let (first, waiter) = tokio::join!(
            cache.get_or_fetch(&key, slow),
            cache.get_or_fetch(&key, slow)
        );

        assert_eq!(first.expect_err("first").kind(), crate::SourceErrorKind::TimedOut);
        assert_eq!(waiter.expect_err("waiter").kind(), crate::SourceErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_key_spaces_are_independent() {
        let summaries = FetchCache::<String>::new(Endpoint::Summary, None);
        let histories = FetchCache::<String>::new(Endpoint::History, None);

        summaries
            .get_or_fetch(&id("CHILE"), |_| async move { Ok(String::from("s")) })
            .await
            .expect("summary");

        assert!(summaries.contains(&id("CHILE")).await);
        assert!(!histories.contains(&id("CHILE")).await);
    }
}
