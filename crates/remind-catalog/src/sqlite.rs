//! SQLite-based search cache.

use chrono::DateTime;
use remind_core::{DatabaseError, RusqliteErrorExt};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::store::{SearchCacheStore, StoreResult};
use crate::types::{ContentType, RawEntry};

/// SQLite cache for search results, one row per (namespace, query).
pub struct SqliteSearchCache {
    conn: Connection,
}

impl SqliteSearchCache {
    /// Create a new cache at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| e.into_database_error())?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| e.into_database_error())?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS search_cache (
                namespace TEXT NOT NULL,
                query TEXT NOT NULL,
                results_json TEXT NOT NULL,
                fetched_at_ms INTEGER NOT NULL,
                PRIMARY KEY (namespace, query)
            );
            "#,
            )
            .map_err(|e| e.into_database_error())
    }

    /// Queries cached in `namespace`, most recently fetched first.
    pub fn list_queries(&self, namespace: ContentType) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT query FROM search_cache WHERE namespace = ?1 ORDER BY fetched_at_ms DESC, query ASC",
            )
            .map_err(|e| e.into_database_error())?;

        let rows = stmt
            .query_map(params![namespace.namespace()], |row| row.get(0))
            .map_err(|e| e.into_database_error())?;

        rows.collect::<Result<Vec<String>, _>>()
            .map_err(|e| e.into_database_error())
    }

    fn row_to_entry(
        query: String,
        results_json: String,
        fetched_at_ms: i64,
    ) -> StoreResult<RawEntry> {
        let results: Vec<serde_json::Value> = serde_json::from_str(&results_json)
            .map_err(|e| DatabaseError::Corruption(format!("results for {:?}: {}", query, e)))?;
        let fetched_at = DateTime::from_timestamp_millis(fetched_at_ms).ok_or_else(|| {
            DatabaseError::Corruption(format!("timestamp {} for {:?}", fetched_at_ms, query))
        })?;

        Ok(RawEntry {
            query,
            results,
            fetched_at,
        })
    }
}

impl SearchCacheStore for SqliteSearchCache {
    fn get(&self, namespace: ContentType, query: &str) -> StoreResult<Option<RawEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT query, results_json, fetched_at_ms FROM search_cache WHERE namespace = ?1 AND query = ?2",
                params![namespace.namespace(), query],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
            )
            .optional()
            .map_err(|e| e.into_database_error())?;

        row.map(|(query, results_json, fetched_at_ms)| {
            Self::row_to_entry(query, results_json, fetched_at_ms)
        })
        .transpose()
    }

    fn put(&self, namespace: ContentType, entry: &RawEntry) -> StoreResult<()> {
        let results_json = serde_json::to_string(&entry.results)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        self.conn
            .execute(
                r#"
            INSERT OR REPLACE INTO search_cache
            (namespace, query, results_json, fetched_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            "#,
                params![
                    namespace.namespace(),
                    entry.query,
                    results_json,
                    entry.fetched_at.timestamp_millis(),
                ],
            )
            .map_err(|e| e.into_database_error())?;
        Ok(())
    }

    fn remove(&self, namespace: ContentType, query: &str) -> StoreResult<bool> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM search_cache WHERE namespace = ?1 AND query = ?2",
                params![namespace.namespace(), query],
            )
            .map_err(|e| e.into_database_error())?;
        Ok(deleted > 0)
    }

    fn count(&self, namespace: ContentType) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM search_cache WHERE namespace = ?1",
                params![namespace.namespace()],
                |row| row.get(0),
            )
            .map_err(|e| e.into_database_error())?;
        Ok(count as usize)
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn
            .execute_batch("DELETE FROM search_cache;")
            .map_err(|e| e.into_database_error())
    }
}
