//! Catalog-specific error types.

use remind_core::{AppError, ConfigError, DatabaseError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Remote service error {status}: {message}")]
    RemoteService { status: u16, message: String },

    #[error("API key rejected by the remote service")]
    Unauthorized,

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Cache read failed: {0}")]
    CacheRead(DatabaseError),

    #[error("Cache write failed: {0}")]
    CacheWrite(DatabaseError),

    #[error("Cached results could not be decoded: {0}")]
    Decode(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl CatalogError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) => e.user_message().to_string(),
            Self::RemoteService { status, .. } if *status >= 500 => {
                "The search service is having trouble. Please try again later.".to_string()
            }
            Self::RemoteService { .. } => "The search request failed.".to_string(),
            Self::Unauthorized => "Search API key was rejected. Check your settings.".to_string(),
            Self::NotConfigured(what) => format!("{} is not configured.", what),
            Self::CacheRead(_) | Self::CacheWrite(_) => "Local search cache error".to_string(),
            Self::Decode(_) => "Saved search results are unreadable.".to_string(),
            Self::Cancelled => "Search cancelled.".to_string(),
            Self::Task(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the remote search itself failed (as opposed to the cache).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RemoteService { .. } | Self::Unauthorized
        )
    }

    /// Whether retrying the same search may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_transient(),
            Self::RemoteService { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Network(e) => AppError::Network(e),
            CatalogError::RemoteService { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            CatalogError::Unauthorized => {
                AppError::Config(ConfigError::Invalid("search API key rejected".to_string()))
            }
            CatalogError::NotConfigured(what) => {
                AppError::Config(ConfigError::MissingSetting(what.to_string()))
            }
            CatalogError::CacheRead(e) | CatalogError::CacheWrite(e) => AppError::Database(e),
            CatalogError::Decode(msg) => AppError::Database(DatabaseError::Corruption(msg)),
            CatalogError::Cancelled => AppError::Cancelled,
            CatalogError::Task(msg) => AppError::Other(anyhow::anyhow!(msg)),
        }
    }
}
