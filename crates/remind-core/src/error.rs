//! Error types shared by the Remind crates.
//!
//! Domain crates keep their own `thiserror` enums and convert into
//! [`AppError`] at the binary boundary, where `user_message()` picks the text
//! shown on the terminal.

use remind_calendar::CalendarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Short, non-technical message for the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Database(e) => e.user_message().to_string(),
            AppError::Config(e) => e.user_message(),
            AppError::Calendar(e) => e.user_message(),
            AppError::Cancelled => "Cancelled.".to_string(),
            AppError::Io(e) => format!("Could not access a local file ({}).", e.kind()),
            AppError::Other(_) => "Something unexpected went wrong.".to_string(),
        }
    }
}

/// Transport-level failures talking to a search API.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Could not reach the search service. Are you online?",
            NetworkError::Timeout => "The search service did not answer in time.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The search service is down right now. Try again later."
            }
            NetworkError::ServerError { .. } => "The search service refused the request.",
            NetworkError::InvalidResponse(_) => "The search service sent a response we could not read.",
        }
    }

    /// Whether the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed(_) | NetworkError::Timeout => true,
            NetworkError::ServerError { status, .. } => *status >= 500 || *status == 429,
            NetworkError::InvalidResponse(_) => false,
        }
    }
}

/// Search cache storage failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Cannot open cache database: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Cache data is corrupt: {0}")]
    Corruption(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => "The search cache file could not be opened.",
            DatabaseError::QueryFailed(_) => "Reading or writing the search cache failed.",
            DatabaseError::Corruption(_) => "The search cache is damaged. Delete the cache file to reset it.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Invalid(what) => format!("Check config.toml: {}.", what),
            ConfigError::MissingSetting(what) => {
                format!("{} needs an API key in config.toml or the environment.", what)
            }
        }
    }
}

/// Classify `reqwest` failures into [`NetworkError`].
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        match self.status() {
            Some(status) => NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            },
            None if self.is_decode() || self.is_body() => {
                NetworkError::InvalidResponse(self.to_string())
            }
            None => NetworkError::ConnectionFailed(self.to_string()),
        }
    }
}

/// Classify `rusqlite` failures into [`DatabaseError`].
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        use rusqlite::ErrorCode;

        match self.sqlite_error_code() {
            Some(ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase) => {
                DatabaseError::Corruption(self.to_string())
            }
            Some(ErrorCode::CannotOpen | ErrorCode::PermissionDenied) => {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}
