//! Search result models, cache namespaces and stored cache entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::genre;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Which catalog a search runs against. Each one is a separate cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Book,
}

impl ContentType {
    /// Stable namespace name used as the cache partition key.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Movie => "movie_searches",
            Self::Book => "book_searches",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "movie_searches" => Some(Self::Movie),
            "book_searches" => Some(Self::Book),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Book => write!(f, "book"),
        }
    }
}

/// A movie search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub genre_ids: Vec<i64>,
}

impl Movie {
    /// Full poster image URL at the given TMDB size (e.g. `w500`).
    pub fn poster_url(&self, size: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}{}", TMDB_IMAGE_BASE, size, p))
    }

    /// Display names of this movie's genres, e.g. `액션, 드라마`.
    pub fn genre_names(&self) -> String {
        genre::genre_names(&self.genre_ids)
    }
}

/// A book search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub title: String,
    pub authors: Vec<String>,
    pub thumbnail: Option<String>,
    /// Publication timestamp as returned by the API (ISO 8601).
    pub datetime: String,
    pub publisher: String,
    pub isbn: String,
}

impl Book {
    /// Authors joined for display.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Publication date (`YYYY-MM-DD`) when the API returned one.
    pub fn publish_date(&self) -> Option<&str> {
        self.datetime.get(..10).filter(|d| !d.is_empty())
    }
}

/// TMDB `search/movie` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieSearchResponse {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_results: u32,
}

/// Kakao `v3/search/book` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookSearchResponse {
    pub documents: Vec<Book>,
}

/// Stored answer for one query in one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub query: String,
    pub results: Vec<T>,
    pub fetched_at: DateTime<Utc>,
}

/// Entry in its storage form, with results kept as JSON values.
pub type RawEntry = CacheEntry<serde_json::Value>;

impl<T> CacheEntry<T> {
    pub fn new(query: impl Into<String>, results: Vec<T>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            results,
            fetched_at,
        }
    }
}

impl<T: Serialize> CacheEntry<T> {
    /// Convert to the storage form.
    pub fn to_raw(&self) -> CatalogResult<RawEntry> {
        let results = self
            .results
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(CacheEntry {
            query: self.query.clone(),
            results,
            fetched_at: self.fetched_at,
        })
    }
}

impl RawEntry {
    /// Decode stored results into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> CatalogResult<CacheEntry<T>> {
        let results = self
            .results
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(CacheEntry {
            query: self.query,
            results,
            fetched_at: self.fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_namespaces_are_distinct() {
        assert_ne!(ContentType::Movie.namespace(), ContentType::Book.namespace());
        assert_eq!(
            ContentType::from_namespace(ContentType::Book.namespace()),
            Some(ContentType::Book)
        );
        assert_eq!(ContentType::from_namespace("daily"), None);
    }

    #[test]
    fn test_movie_defaults_for_missing_fields() {
        let movie: Movie = serde_json::from_value(serde_json::json!({
            "id": 438631,
            "title": "듄",
            "adult": false
        }))
        .unwrap();
        assert_eq!(movie.id, 438631);
        assert!(movie.poster_path.is_none());
        assert!(movie.genre_ids.is_empty());
        assert_eq!(movie.release_date, "");
    }

    #[test]
    fn test_poster_url() {
        let movie = Movie {
            poster_path: Some("/abc.jpg".to_string()),
            ..Default::default()
        };
        assert_eq!(
            movie.poster_url("w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert!(Movie::default().poster_url("w500").is_none());
    }

    #[test]
    fn test_book_helpers() {
        let book: Book = serde_json::from_value(serde_json::json!({
            "title": "채식주의자",
            "authors": ["한강"],
            "datetime": "2007-10-30T00:00:00.000+09:00",
            "publisher": "창비",
            "isbn": "8936433598 9788936433598",
            "price": 12000
        }))
        .unwrap();
        assert_eq!(book.author_line(), "한강");
        assert_eq!(book.publish_date(), Some("2007-10-30"));
        assert!(Book::default().publish_date().is_none());
    }

    #[test]
    fn test_raw_entry_round_trip_keeps_order() {
        let movies = vec![
            Movie {
                id: 2,
                title: "B".into(),
                ..Default::default()
            },
            Movie {
                id: 1,
                title: "A".into(),
                ..Default::default()
            },
        ];
        let entry = CacheEntry::new("q", movies.clone(), Utc::now());
        let decoded: CacheEntry<Movie> = entry.to_raw().unwrap().decode().unwrap();
        assert_eq!(decoded.results, movies);
        assert_eq!(decoded.query, "q");
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let raw = RawEntry::new("q", vec![serde_json::json!("not a movie")], Utc::now());
        let err = raw.decode::<Movie>().unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
