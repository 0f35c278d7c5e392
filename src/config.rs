//! Recorder configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable overriding the server URL.
pub const SERVER_URL_ENV: &str = "STATKEEPER_SERVER_URL";
/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "STATKEEPER_DATABASE";

/// Where games are stored and where they are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct RecorderConfig {
    /// Base URL of the stats server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Path of the sqlite database holding local games.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Timeout for each HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

#[instrument]
fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

#[instrument]
fn default_database_path() -> String {
    "statkeeper.db".to_string()
}

#[instrument]
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            database_path: default_database_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RecorderConfig {
    /// Loads configuration from TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::new("request_timeout_secs must be positive"));
        }
        Ok(config)
    }

    /// Loads the file when it exists, otherwise starts from defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `STATKEEPER_SERVER_URL` and `STATKEEPER_DATABASE` when set.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(SERVER_URL_ENV).ok(),
            std::env::var(DATABASE_ENV).ok(),
        )
    }

    /// Replaces the server URL and database path when given.
    pub fn with_overrides(mut self, server_url: Option<String>, database_path: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|s| !s.trim().is_empty()) {
            debug!(server_url = %url, "Overriding server URL");
            self.server_url = url;
        }
        if let Some(path) = database_path.filter(|s| !s.trim().is_empty()) {
            debug!(database_path = %path, "Overriding database path");
            self.database_path = path;
        }
        self
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
