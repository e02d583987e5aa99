//! Cache-or-fetch resolution of search queries.
//!
//! A query is answered from the store when an entry exists for
//! `(content type, query)`. Otherwise the caller's fetch runs once and its
//! result is written as a new entry before being returned. Failed or
//! cancelled fetches write nothing.
//!
//! Query strings are used verbatim as keys: `"Dune"` and `"dune"` are two
//! entries. Entries never expire.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::store::SearchCacheStore;
use crate::types::{CacheEntry, ContentType, RawEntry};

/// Source of the timestamp stamped on new entries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

type SharedStore = Arc<Mutex<Box<dyn SearchCacheStore>>>;
type SlotKey = (ContentType, String);
type SlotMap = Mutex<HashMap<SlotKey, Arc<tokio::sync::Mutex<()>>>>;

pub struct CachedCatalogLookup {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    dedupe_in_flight: bool,
    in_flight: SlotMap,
}

impl CachedCatalogLookup {
    /// Create a lookup over `store`, stamping entries with the system clock.
    pub fn new(store: impl SearchCacheStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
            clock: Arc::new(SystemClock),
            dedupe_in_flight: true,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the clock used to stamp new entries.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Enable or disable collapsing of concurrent misses for the same query.
    ///
    /// When disabled, every concurrent caller fetches and the last write wins.
    pub fn with_deduplication(mut self, enabled: bool) -> Self {
        self.dedupe_in_flight = enabled;
        self
    }

    /// Resolve `query` in the `content_type` namespace.
    ///
    /// `fetch` is only called on a cache miss and receives the query text.
    /// A failed cache write is logged and the fetched results are still
    /// returned; the next resolve for the query fetches again.
    ///
    /// # Errors
    /// - `Cancelled` if `cancel` fires before or during the fetch.
    /// - The fetch's own error on a failed remote search.
    /// - `CacheRead` / `Decode` if the stored entry cannot be read.
    #[instrument(skip(self, cancel, fetch), fields(namespace = content_type.namespace()), level = "debug")]
    pub async fn resolve<T, F, Fut>(
        &self,
        content_type: ContentType,
        query: &str,
        cancel: &CancellationToken,
        fetch: F,
    ) -> CatalogResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = CatalogResult<Vec<T>>>,
    {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let _slot = if self.dedupe_in_flight {
            Some(self.claim_slot(content_type, query, cancel).await?)
        } else {
            None
        };

        if let Some(raw) = self.load(content_type, query).await? {
            let entry: CacheEntry<T> = raw.decode()?;
            tracing::debug!(count = entry.results.len(), "search cache hit");
            return Ok(entry.results);
        }

        tracing::debug!("search cache miss, fetching");
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("search cancelled during fetch");
                return Err(CatalogError::Cancelled);
            }
            fetched = fetch(query.to_string()) => fetched?,
        };

        let entry = CacheEntry::new(query, results, self.clock.now());
        match self.persist(content_type, &entry).await {
            Ok(()) => tracing::debug!(count = entry.results.len(), "search results cached"),
            Err(e) => tracing::warn!("Failed to cache search results: {}", e),
        }

        Ok(entry.results)
    }

    /// Read the stored entry for a query without fetching.
    pub async fn entry<T: DeserializeOwned>(
        &self,
        content_type: ContentType,
        query: &str,
    ) -> CatalogResult<Option<CacheEntry<T>>> {
        self.load(content_type, query)
            .await?
            .map(RawEntry::decode)
            .transpose()
    }

    /// Number of stored entries in a namespace.
    pub async fn count(&self, content_type: ContentType) -> CatalogResult<usize> {
        self.with_store(move |store| store.count(content_type))
            .await?
            .map_err(CatalogError::CacheRead)
    }

    /// Drop the stored entry for a query so the next resolve fetches again.
    pub async fn invalidate(&self, content_type: ContentType, query: &str) -> CatalogResult<bool> {
        let query = query.to_string();
        self.with_store(move |store| store.remove(content_type, &query))
            .await?
            .map_err(CatalogError::CacheWrite)
    }

    /// Drop every stored entry.
    pub async fn clear(&self) -> CatalogResult<()> {
        self.with_store(|store| store.clear())
            .await?
            .map_err(CatalogError::CacheWrite)
    }

    async fn load(&self, content_type: ContentType, query: &str) -> CatalogResult<Option<RawEntry>> {
        let query = query.to_string();
        self.with_store(move |store| store.get(content_type, &query))
            .await?
            .map_err(CatalogError::CacheRead)
    }

    async fn persist<T: Serialize>(
        &self,
        content_type: ContentType,
        entry: &CacheEntry<T>,
    ) -> CatalogResult<()> {
        let raw = entry.to_raw()?;
        self.with_store(move |store| store.put(content_type, &raw))
            .await?
            .map_err(CatalogError::CacheWrite)
    }

    /// Run a store operation on the blocking pool.
    async fn with_store<R, F>(&self, op: F) -> CatalogResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&dyn SearchCacheStore) -> R + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store.lock();
            op(&**guard)
        })
        .await
        .map_err(|e| CatalogError::Task(e.to_string()))
    }

    /// Wait until no other resolve for the same key is between its cache
    /// check and its cache write.
    async fn claim_slot(
        &self,
        content_type: ContentType,
        query: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<InFlightSlot<'_>> {
        let key = (content_type, query.to_string());
        let lock = Arc::clone(self.in_flight.lock().entry(key.clone()).or_default());
        let mut slot = InFlightSlot {
            map: &self.in_flight,
            key,
            lock,
            guard: None,
        };

        let acquired = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            guard = Arc::clone(&slot.lock).lock_owned() => Some(guard),
        };
        match acquired {
            Some(guard) => {
                slot.guard = Some(guard);
                Ok(slot)
            }
            None => Err(CatalogError::Cancelled),
        }
    }
}

/// Exclusive claim on one `(namespace, query)` key.
struct InFlightSlot<'a> {
    map: &'a SlotMap,
    key: SlotKey,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self.map.lock();
        // Only the map and this slot still reference the lock: nobody is waiting.
        if Arc::strong_count(&self.lock) <= 2 {
            map.remove(&self.key);
        }
    }
}
