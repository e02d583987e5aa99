//! Movie and book search for the Remind diary.
//!
//! Provides the TMDB and Kakao search clients and the per-query result cache
//! they are served through.

pub mod client;
pub mod error;
pub mod genre;
pub mod lookup;
pub mod service;
pub mod sqlite;
pub mod store;
pub mod types;

pub use client::{http_client, BookClient, MovieClient};
pub use error::{CatalogError, CatalogResult};
pub use genre::{genre_name, genre_names};
pub use lookup::{CachedCatalogLookup, Clock, SystemClock};
pub use service::CatalogService;
pub use sqlite::SqliteSearchCache;
pub use store::{MemorySearchCache, SearchCacheStore, StoreResult};
pub use types::{Book, CacheEntry, ContentType, Movie, RawEntry};
