//! HTTP clients for the movie (TMDB) and book (Kakao) search APIs.

use std::time::Duration;

use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::types::{Book, BookSearchResponse, Movie, MovieSearchResponse};

/// Build the shared HTTP client with a per-request timeout.
pub fn http_client(timeout_secs: u64) -> CatalogResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

pub struct MovieClient {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl MovieClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, language: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            language: language.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search movies by title.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> CatalogResult<Vec<Movie>> {
        let url = format!(
            "{}/search/movie?query={}&api_key={}&language={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language),
        );

        let response = self.client.get(&url).send().await?;

        let resp: MovieSearchResponse = handle_response(response).await?;
        tracing::debug!(
            page = resp.page,
            total = resp.total_results,
            "movie search returned {} results",
            resp.results.len()
        );
        Ok(resp.results)
    }
}

pub struct BookClient {
    client: reqwest::Client,
    api_key: String,
    page_size: u32,
    base_url: String,
}

impl BookClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, page_size: u32) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            page_size,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("KakaoAK {}", self.api_key)
    }

    /// Search books by title, author or ISBN.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> CatalogResult<Vec<Book>> {
        let url = format!(
            "{}/v3/search/book?query={}&size={}",
            self.base_url,
            urlencoding::encode(query),
            self.page_size,
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let resp: BookSearchResponse = handle_response(response).await?;
        tracing::debug!("book search returned {} results", resp.documents.len());
        Ok(resp.documents)
    }
}

/// Decode a successful response or map the status to a `CatalogError`.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> CatalogResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(format!("JSON parse error: {}", e)))
    } else if status.as_u16() == 401 || status.as_u16() == 403 {
        Err(CatalogError::Unauthorized)
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(CatalogError::RemoteService {
            status: status.as_u16(),
            message: text,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn movie_client(base_url: &str) -> MovieClient {
        MovieClient::new(http_client(5).unwrap(), base_url, "tmdb_key", "ko-KR")
    }

    fn book_client(base_url: &str) -> BookClient {
        BookClient::new(http_client(5).unwrap(), base_url, "kakao_key", 20)
    }

    #[tokio::test]
    async fn test_movie_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "듄 파트2"))
            .and(query_param("api_key", "tmdb_key"))
            .and(query_param("language", "ko-KR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "page": 1,
                "total_results": 2,
                "results": [
                    {"id": 693134, "title": "듄: 파트2", "release_date": "2024-02-27",
                     "poster_path": "/p.jpg", "genre_ids": [878, 12]},
                    {"id": 438631, "title": "듄", "release_date": "2021-09-15", "genre_ids": []}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let movies = movie_client(&mock_server.uri())
            .search("듄 파트2")
            .await
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, 693134);
        assert_eq!(movies[0].genre_names(), "SF, 어드벤처");
        assert!(movies[1].poster_path.is_none());
    }

    #[tokio::test]
    async fn test_book_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/search/book"))
            .and(query_param("query", "rust"))
            .and(query_param("size", "20"))
            .and(header("Authorization", "KakaoAK kakao_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"total_count": 1, "is_end": true},
                "documents": [
                    {"title": "러스트 프로그래밍", "authors": ["A", "B"],
                     "datetime": "2020-01-01T00:00:00.000+09:00", "publisher": "P",
                     "isbn": "1 2", "thumbnail": "https://img/1.jpg"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let books = book_client(&mock_server.uri()).search("rust").await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].author_line(), "A, B");
        assert_eq!(books[0].publish_date(), Some("2020-01-01"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/search/book"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = book_client(&mock_server.uri()).search("rust").await;
        assert!(matches!(result, Err(CatalogError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let err = movie_client(&mock_server.uri())
            .search("dune")
            .await
            .unwrap_err();

        match &err {
            CatalogError::RemoteService { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let result = movie_client(&mock_server.uri()).search("dune").await;
        assert!(matches!(result, Err(CatalogError::Decode(_))));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/search/book"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"documents": []})),
            )
            .mount(&mock_server)
            .await;

        let base = format!("{}/", mock_server.uri());
        let books = book_client(&base).search("x").await.unwrap();
        assert!(books.is_empty());
    }
}
