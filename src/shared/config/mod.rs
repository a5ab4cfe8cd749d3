//! Sync core configuration
//!
//! Settings for the local database, the HTTP remote client and the retry
//! budget. Values come from built-in defaults, an optional TOML file, and
//! environment variables, in that order of precedence (later wins).
//!
//! # Environment variables
//!
//! - `RENTSYNC_DB_PATH` - SQLite database file
//! - `RENTSYNC_API_URL` - base URL of the rental API
//! - `RENTSYNC_API_TOKEN` - bearer token sent with every request
//! - `RENTSYNC_REQUEST_TIMEOUT_SECS` - per-request timeout
//! - `RENTSYNC_MAX_RETRY_COUNT` - replay attempts before a change is dropped

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default base URL of the rental API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Default number of replay attempts for one pending change
pub const MAX_RETRY_COUNT: u32 = 3;

/// Default per-request timeout of the HTTP remote client
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Sync core configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Base URL of the rental API
    pub api_base_url: String,
    /// Bearer token for the rental API
    pub api_token: Option<String>,
    /// Per-request timeout of the HTTP remote client
    pub request_timeout: Duration,
    /// Replay attempts before a pending change is abandoned
    pub max_retry_count: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retry_count: MAX_RETRY_COUNT,
        }
    }
}

impl SyncConfig {
    /// Create a new SyncConfigBuilder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load configuration from an optional TOML file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = match path {
            Some(path) => SyncConfigBuilder::from_toml_file(path)?,
            None => SyncConfigBuilder::default(),
        };
        builder
            .with_env_overrides(|key| std::env::var(key).ok())?
            .build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_base_url.clone()));
        }
        if self.max_retry_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_retry_count",
                value: "0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Platform data directory location of the local database
fn default_database_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("rentsync");
    path.push("local.db");
    path
}

/// On-disk layout of the TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database_path: Option<PathBuf>,
    api_base_url: Option<String>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
    max_retry_count: Option<u32>,
}

/// Builder for SyncConfig
#[derive(Debug, Default, Clone)]
pub struct SyncConfigBuilder {
    database_path: Option<PathBuf>,
    api_base_url: Option<String>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
    max_retry_count: Option<u32>,
}

impl SyncConfigBuilder {
    /// Start from the values of a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Start from the values of a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self {
            database_path: file.database_path,
            api_base_url: file.api_base_url,
            api_token: file.api_token,
            request_timeout_secs: file.request_timeout_secs,
            max_retry_count: file.max_retry_count,
        })
    }

    /// Apply `RENTSYNC_*` overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RENTSYNC_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("RENTSYNC_API_URL") {
            self.api_base_url = Some(url);
        }
        if let Some(token) = lookup("RENTSYNC_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(raw) = lookup("RENTSYNC_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_number("request_timeout_secs", &raw)?);
        }
        if let Some(raw) = lookup("RENTSYNC_MAX_RETRY_COUNT") {
            self.max_retry_count = Some(parse_number("max_retry_count", &raw)?);
        }
        Ok(self)
    }

    /// Set the database path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the API bearer token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set the retry budget
    pub fn max_retry_count(mut self, count: u32) -> Self {
        self.max_retry_count = Some(count);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let defaults = SyncConfig::default();
        let config = SyncConfig {
            database_path: self.database_path.unwrap_or(defaults.database_path),
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            api_token: self.api_token,
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_retry_count: self.max_retry_count.unwrap_or(defaults.max_retry_count),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path:?}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::builder().build().unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.max_retry_count, MAX_RETRY_COUNT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.api_token.is_none());
        assert!(config.database_path.ends_with("rentsync/local.db"));
    }

    #[test]
    fn test_toml_then_env_precedence() {
        let raw = r#"
            api_base_url = "https://file.example.com"
            max_retry_count = 5
            request_timeout_secs = 10
        "#;
        let env: HashMap<&str, &str> = [
            ("RENTSYNC_MAX_RETRY_COUNT", "7"),
            ("RENTSYNC_API_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let config = SyncConfigBuilder::from_toml_str(raw)
            .unwrap()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.api_base_url, "https://file.example.com");
        assert_eq!(config.max_retry_count, 7);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_unknown_toml_key_rejected() {
        let result = SyncConfigBuilder::from_toml_str("retry = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_env_number() {
        let result = SyncConfig::builder()
            .with_env_overrides(|key| (key == "RENTSYNC_MAX_RETRY_COUNT").then(|| "lots".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "max_retry_count", .. })
        ));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            SyncConfig::builder().api_base_url("ftp://nope").build(),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            SyncConfig::builder().max_retry_count(0).build(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
