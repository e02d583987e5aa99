//! Movie and book search backed by the shared search cache.

use remind_core::CatalogConfig;
use tokio_util::sync::CancellationToken;

use crate::client::{http_client, BookClient, MovieClient};
use crate::error::{CatalogError, CatalogResult};
use crate::lookup::CachedCatalogLookup;
use crate::store::SearchCacheStore;
use crate::types::{Book, ContentType, Movie};

/// Search facade owning the cache lookup and one client per catalog.
///
/// A catalog without an API key has no client; searching it fails with
/// `NotConfigured` without touching the cache.
pub struct CatalogService {
    lookup: CachedCatalogLookup,
    movies: Option<MovieClient>,
    books: Option<BookClient>,
}

impl CatalogService {
    pub fn new(
        lookup: CachedCatalogLookup,
        movies: Option<MovieClient>,
        books: Option<BookClient>,
    ) -> Self {
        Self {
            lookup,
            movies,
            books,
        }
    }

    /// Build clients and lookup from the `[catalog]` config section.
    pub fn from_config(
        config: &CatalogConfig,
        store: impl SearchCacheStore + 'static,
    ) -> CatalogResult<Self> {
        let http = http_client(config.request_timeout_secs)?;

        let movies = config.movie_key().map(|key| {
            MovieClient::new(
                http.clone(),
                &config.movie_api_url,
                key,
                &config.movie_language,
            )
        });
        let books = config.book_key().map(|key| {
            BookClient::new(
                http.clone(),
                &config.book_api_url,
                key,
                config.book_page_size,
            )
        });

        let lookup = CachedCatalogLookup::new(store).with_deduplication(config.dedupe_in_flight);

        tracing::info!(
            movies = movies.is_some(),
            books = books.is_some(),
            "Catalog service ready"
        );
        Ok(Self::new(lookup, movies, books))
    }

    pub fn lookup(&self) -> &CachedCatalogLookup {
        &self.lookup
    }

    pub async fn search_movies(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<Vec<Movie>> {
        let client = self
            .movies
            .as_ref()
            .ok_or(CatalogError::NotConfigured("Movie search"))?;

        self.lookup
            .resolve(ContentType::Movie, query, cancel, |q| async move {
                client.search(&q).await
            })
            .await
    }

    pub async fn search_books(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<Vec<Book>> {
        let client = self
            .books
            .as_ref()
            .ok_or(CatalogError::NotConfigured("Book search"))?;

        self.lookup
            .resolve(ContentType::Book, query, cancel, |q| async move {
                client.search(&q).await
            })
            .await
    }
}
