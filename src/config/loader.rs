//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/default.toml.
//! Secrets are never required in the file; they can come from the environment.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::stock_api::StockApiConfig;
use crate::application::EngineConfig;
use crate::domain::{Alignment, DEFAULT_WINDOW_MINUTES, SUPPORTED_WINDOWS};

const ENV_BASE_URL: &str = "STOCK_API_BASE_URL";
const ENV_CLIENT_ID: &str = "STOCK_API_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "STOCK_API_CLIENT_SECRET";
const ENV_TOKEN: &str = "STOCK_API_TOKEN";

/// Upper bound on attempts per request; 429 back-off doubles per attempt
pub const MAX_RETRIES_LIMIT: u32 = 5;

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Provider API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    /// Provider base URL (the part before `/stocks` and `/auth`)
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

impl ApiSection {
    /// Get base URL with environment variable override
    /// Checks STOCK_API_BASE_URL env var first, falls back to config value
    pub fn get_base_url(&self) -> String {
        std::env::var(ENV_BASE_URL).unwrap_or_else(|_| self.base_url.clone())
    }
}

/// Client credential section (optional; prefer the environment)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthSection {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl AuthSection {
    /// Checks STOCK_API_CLIENT_ID env var first, falls back to config value
    pub fn get_client_id(&self) -> Option<String> {
        std::env::var(ENV_CLIENT_ID).ok().or_else(|| self.client_id.clone())
    }

    /// Checks STOCK_API_CLIENT_SECRET env var first, falls back to config value
    pub fn get_client_secret(&self) -> Option<String> {
        std::env::var(ENV_CLIENT_SECRET).ok().or_else(|| self.client_secret.clone())
    }

    /// Pre-issued bearer token from STOCK_API_TOKEN, if any
    pub fn get_static_token(&self) -> Option<String> {
        std::env::var(ENV_TOKEN).ok().filter(|t| !t.trim().is_empty())
    }
}

/// Correlation engine section
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Window used when the user does not pick one
    #[serde(default = "default_window_minutes")]
    pub default_window_minutes: u32,
    /// Windows offered by the front end
    #[serde(default = "default_supported_windows")]
    pub supported_windows: Vec<u32>,
    /// Maximum concurrent price requests
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Sample pairing: "timestamp" or "tail"
    #[serde(default)]
    pub alignment: Alignment,
}

fn default_window_minutes() -> u32 {
    DEFAULT_WINDOW_MINUTES
}

fn default_supported_windows() -> Vec<u32> {
    SUPPORTED_WINDOWS.to_vec()
}

fn default_fetch_concurrency() -> usize {
    8
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            default_window_minutes: default_window_minutes(),
            supported_windows: default_supported_windows(),
            fetch_concurrency: default_fetch_concurrency(),
            alignment: Alignment::default(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.api.max_retries == 0 || self.api.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "api.max_retries must be between 1 and {}, got {}",
                MAX_RETRIES_LIMIT, self.api.max_retries
            )));
        }

        if self.engine.supported_windows.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine.supported_windows must not be empty".to_string(),
            ));
        }

        if self.engine.supported_windows.contains(&0) {
            return Err(ConfigError::ValidationError(
                "engine.supported_windows must all be > 0".to_string(),
            ));
        }

        if !self.engine.supported_windows.contains(&self.engine.default_window_minutes) {
            return Err(ConfigError::ValidationError(format!(
                "engine.default_window_minutes ({}) must be one of {:?}",
                self.engine.default_window_minutes, self.engine.supported_windows
            )));
        }

        if self.engine.fetch_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "engine.fetch_concurrency must be > 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}

impl From<&Config> for StockApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.api.get_base_url(),
            client_id: config.auth.get_client_id(),
            client_secret: config.auth.get_client_secret(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            max_retries: config.api.max_retries,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        EngineConfig::default()
            .with_concurrency(config.engine.fetch_concurrency)
            .with_alignment(config.engine.alignment)
    }
}
