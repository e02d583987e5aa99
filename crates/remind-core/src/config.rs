use anyhow::{Context, Result};
use remind_calendar::{CalendarError, YearRange};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Kakao's book search accepts at most 50 documents per page.
const MAX_BOOK_PAGE_SIZE: u32 = 50;

/// Environment variable holding the TMDB API key.
pub const MOVIE_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable holding the Kakao REST API key.
pub const BOOK_API_KEY_ENV: &str = "KAKAO_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Movie and book search settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Calendar view settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Search cache storage
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the movie metadata API (TMDB v3)
    #[serde(default = "default_movie_api_url")]
    pub movie_api_url: String,

    /// TMDB API key stored in the file; `TMDB_API_KEY` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_api_key: Option<String>,

    /// `TMDB_API_KEY` as seen at load time, never written back
    #[serde(skip)]
    pub movie_api_key_env: Option<String>,

    /// Language requested from the movie API
    #[serde(default = "default_movie_language")]
    pub movie_language: String,

    /// Base URL of the book metadata API (Kakao search)
    #[serde(default = "default_book_api_url")]
    pub book_api_url: String,

    /// Kakao REST API key stored in the file; `KAKAO_API_KEY` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_api_key: Option<String>,

    /// `KAKAO_API_KEY` as seen at load time, never written back
    #[serde(skip)]
    pub book_api_key_env: Option<String>,

    /// Number of books requested per search
    #[serde(default = "default_book_page_size")]
    pub book_page_size: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Collapse concurrent searches for the same uncached query into one request
    #[serde(default = "default_dedupe_in_flight")]
    pub dedupe_in_flight: bool,
}

fn default_movie_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_movie_language() -> String {
    "ko-KR".to_string()
}

fn default_book_api_url() -> String {
    "https://dapi.kakao.com".to_string()
}

fn default_book_page_size() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_dedupe_in_flight() -> bool {
    true
}

impl CatalogConfig {
    /// Effective TMDB key: the environment first, then the file. Blank keys count as missing.
    pub fn movie_key(&self) -> Option<&str> {
        non_blank(self.movie_api_key_env.as_deref()).or(non_blank(self.movie_api_key.as_deref()))
    }

    /// Effective Kakao key: the environment first, then the file. Blank keys count as missing.
    pub fn book_key(&self) -> Option<&str> {
        non_blank(self.book_api_key_env.as_deref()).or(non_blank(self.book_api_key.as_deref()))
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            movie_api_url: default_movie_api_url(),
            movie_api_key: None,
            movie_api_key_env: None,
            movie_language: default_movie_language(),
            book_api_url: default_book_api_url(),
            book_api_key: None,
            book_api_key_env: None,
            book_page_size: default_book_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            dedupe_in_flight: default_dedupe_in_flight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First year reachable through navigation
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Last year reachable through navigation
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_min_year() -> i32 {
    YearRange::default().min_year()
}

fn default_max_year() -> i32 {
    YearRange::default().max_year()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl CalendarConfig {
    /// The navigable year range.
    pub fn year_range(&self) -> Result<YearRange, CalendarError> {
        YearRange::new(self.min_year, self.max_year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// SQLite file name, relative to `config_dir` unless absolute
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_db_file() -> String {
    "search_cache.db".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remind");

        Self {
            config_dir,
            catalog: CatalogConfig::default(),
            calendar: CalendarConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    ///
    /// API keys from the environment are read on every load and override
    /// the file; they are never written to it.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::load_with_env(config_path, |name| std::env::var(name).ok())
    }

    fn load_with_env(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            toml::from_str::<Config>(&contents)
                .context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.catalog.movie_api_key_env = env(MOVIE_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        config.catalog.book_api_key_env = env(BOOK_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.catalog.movie_api_url, "catalog.movie_api_url", &mut result);
        self.validate_url(&self.catalog.book_api_url, "catalog.book_api_url", &mut result);

        if self.catalog.movie_key().is_none() {
            result.add_warning(
                "catalog.movie_api_key",
                "TMDB API key not configured - movie search will be unavailable",
            );
        }
        if self.catalog.book_key().is_none() {
            result.add_warning(
                "catalog.book_api_key",
                "Kakao API key not configured - book search will be unavailable",
            );
        }

        if self.catalog.book_page_size == 0 || self.catalog.book_page_size > MAX_BOOK_PAGE_SIZE {
            result.add_error(
                "catalog.book_page_size",
                format!("Page size must be between 1 and {}", MAX_BOOK_PAGE_SIZE),
            );
        }

        if self.catalog.request_timeout_secs == 0 {
            result.add_error(
                "catalog.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.catalog.request_timeout_secs > 120 {
            result.add_warning(
                "catalog.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if let Err(e) = self.calendar.year_range() {
            result.add_error("calendar", e.to_string());
        }

        if self.cache.db_file.trim().is_empty() {
            result.add_error("cache.db_file", "Cache file name must not be empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Location of the search cache database.
    pub fn cache_db_path(&self) -> PathBuf {
        let file = PathBuf::from(&self.cache.db_file);
        if file.is_absolute() {
            file
        } else {
            self.config_dir.join(file)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("remind");

        Ok(config_dir.join("config.toml"))
    }
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn keyed_config() -> Config {
        let mut config = Config::default();
        config.catalog.movie_api_key = Some("tmdb".to_string());
        config.catalog.book_api_key = Some("kakao".to_string());
        config
    }

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_keyed_config_has_no_warnings() {
        let result = keyed_config().validate();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_missing_api_keys_are_warnings() {
        let mut config = keyed_config();
        config.catalog.movie_api_key = None;
        config.catalog.book_api_key = Some("   ".to_string());
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "catalog.movie_api_key"));
        assert!(result.warnings.iter().any(|w| w.field == "catalog.book_api_key"));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = keyed_config();
        config.catalog.movie_api_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "catalog.movie_api_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = keyed_config();
        config.catalog.book_api_url = "ftp://dapi.kakao.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_book_page_size_bounds() {
        let mut config = keyed_config();
        config.catalog.book_page_size = 0;
        assert!(!config.validate().is_valid());
        config.catalog.book_page_size = 51;
        assert!(!config.validate().is_valid());
        config.catalog.book_page_size = 50;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = keyed_config();
        config.catalog.request_timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "catalog.request_timeout_secs"));
    }

    #[test]
    fn test_inverted_year_range() {
        let mut config = keyed_config();
        config.calendar.min_year = 2100;
        config.calendar.max_year = 2000;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "calendar"));
    }

    #[test]
    fn test_cache_db_path() {
        let mut config = Config::default();
        config.config_dir = PathBuf::from("/tmp/remind");
        assert_eq!(config.cache_db_path(), PathBuf::from("/tmp/remind/search_cache.db"));

        config.cache.db_file = "/var/cache/remind.db".to_string();
        assert_eq!(config.cache_db_path(), PathBuf::from("/var/cache/remind.db"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = keyed_config();
        config.catalog.book_page_size = 30;
        config.calendar.min_year = 1950;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.catalog.book_page_size, 30);
        assert_eq!(loaded.calendar.min_year, 1950);
        assert_eq!(loaded.catalog.movie_api_key.as_deref(), Some("tmdb"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(!path.exists());

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.catalog.movie_language, "ko-KR");
    }

    #[test]
    fn test_env_keys_are_not_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let env = |name: &str| match name {
            MOVIE_API_KEY_ENV => Some("tmdb-from-env".to_string()),
            BOOK_API_KEY_ENV => Some("kakao-from-env".to_string()),
            _ => None,
        };

        let config = Config::load_with_env(&path, env).unwrap();
        assert_eq!(config.catalog.movie_key(), Some("tmdb-from-env"));
        assert_eq!(config.catalog.book_key(), Some("kakao-from-env"));

        config.save_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("from-env"), "{written}");
        assert!(!written.contains("api_key"), "{written}");
    }

    #[test]
    fn test_rotated_env_key_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        keyed_config().save_to(&path).unwrap();

        let first = Config::load_with_env(&path, |name| {
            (name == MOVIE_API_KEY_ENV).then(|| "old".to_string())
        })
        .unwrap();
        assert_eq!(first.catalog.movie_key(), Some("old"));
        first.save_to(&path).unwrap();

        let second = Config::load_with_env(&path, |name| {
            (name == MOVIE_API_KEY_ENV).then(|| "rotated".to_string())
        })
        .unwrap();
        assert_eq!(second.catalog.movie_key(), Some("rotated"));
        assert_eq!(second.catalog.book_key(), Some("kakao"));

        let unset = Config::load_with_env(&path, |_| None).unwrap();
        assert_eq!(unset.catalog.movie_key(), Some("tmdb"));
    }

    #[test]
    fn test_blank_env_key_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        keyed_config().save_to(&path).unwrap();

        let config = Config::load_with_env(&path, |_| Some("  ".to_string())).unwrap();
        assert_eq!(config.catalog.movie_key(), Some("tmdb"));
        assert_eq!(config.catalog.book_key(), Some("kakao"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = \"/tmp/remind\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog.book_page_size, 20);
        assert_eq!(config.calendar.max_year, 2125);
        assert!(config.catalog.dedupe_in_flight);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
