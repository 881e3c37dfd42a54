//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use word_guess::Rules;

/// Cost range bcrypt accepts.
const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

/// Configuration for the game server.
///
/// Values come from an optional TOML file, then environment variables
/// (`DATABASE_URL`, `HOST`, `PORT`), then command-line flags.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[serde(default)]
#[setters(prefix = "with_", into)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Path of the SQLite database file.
    database_url: String,

    /// Lifetime of issued bearer tokens, in hours.
    token_ttl_hours: i64,

    /// bcrypt cost for stored passwords.
    password_hash_cost: u32,

    /// Game and quota limits.
    rules: Rules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "word_guess.db".to_string(),
            token_ttl_hours: 24,
            password_hash_cost: bcrypt::DEFAULT_COST,
            rules: Rules::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(database = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file at `path` if given (a missing file is an error), or the
    /// defaults otherwise, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unreadable files or malformed variables.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `DATABASE_URL`, `HOST` and `PORT` as returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PORT` is not a valid port number.
    #[instrument(skip_all)]
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            debug!(%url, "DATABASE_URL override");
            self.database_url = url;
        }
        if let Some(host) = lookup("HOST") {
            debug!(%host, "HOST override");
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("PORT is not a valid port: '{}'", port)))?;
            debug!(port = self.port, "PORT override");
        }
        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::new(format!(
                "token_ttl_hours must be positive, got {}",
                self.token_ttl_hours
            )));
        }
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.password_hash_cost) {
            return Err(ConfigError::new(format!(
                "password_hash_cost must be between {} and {}, got {}",
                MIN_HASH_COST,
                MAX_HASH_COST,
                self.password_hash_cost
            )));
        }
        Ok(self)
    }

    /// Token lifetime as a duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
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
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
