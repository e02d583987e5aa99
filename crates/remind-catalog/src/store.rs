//! Search cache storage trait and an in-memory implementation.
//!
//! Stores are partitioned by [`ContentType`]; the same query string in two
//! namespaces addresses two unrelated entries.

use std::collections::HashMap;

use remind_core::DatabaseError;

use crate::types::{ContentType, RawEntry};

/// Result type for cache store operations.
pub type StoreResult<T> = Result<T, DatabaseError>;

/// Trait for search cache backends.
///
/// Implementations don't need to be Sync; the lookup wraps the store in a Mutex.
pub trait SearchCacheStore: Send {
    /// Get the entry for `query` in `namespace`, if one was stored.
    fn get(&self, namespace: ContentType, query: &str) -> StoreResult<Option<RawEntry>>;

    /// Store `entry` under `(namespace, entry.query)`.
    fn put(&self, namespace: ContentType, entry: &RawEntry) -> StoreResult<()>;

    /// Remove one entry. Returns whether it existed.
    fn remove(&self, namespace: ContentType, query: &str) -> StoreResult<bool>;

    /// Number of entries in `namespace`.
    fn count(&self, namespace: ContentType) -> StoreResult<usize>;

    /// Drop every entry in every namespace.
    fn clear(&self) -> StoreResult<()>;
}

/// Process-local store, used for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemorySearchCache {
    entries: parking_lot::Mutex<HashMap<(ContentType, String), RawEntry>>,
}

impl MemorySearchCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchCacheStore for MemorySearchCache {
    fn get(&self, namespace: ContentType, query: &str) -> StoreResult<Option<RawEntry>> {
        Ok(self
            .entries
            .lock()
            .get(&(namespace, query.to_string()))
            .cloned())
    }

    fn put(&self, namespace: ContentType, entry: &RawEntry) -> StoreResult<()> {
        self.entries
            .lock()
            .insert((namespace, entry.query.clone()), entry.clone());
        Ok(())
    }

    fn remove(&self, namespace: ContentType, query: &str) -> StoreResult<bool> {
        Ok(self
            .entries
            .lock()
            .remove(&(namespace, query.to_string()))
            .is_some())
    }

    fn count(&self, namespace: ContentType) -> StoreResult<usize> {
        Ok(self
            .entries
            .lock()
            .keys()
            .filter(|(ns, _)| *ns == namespace)
            .count())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
