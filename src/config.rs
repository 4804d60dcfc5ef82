//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "native")]
use std::path::Path;

use crate::api::DEFAULT_API_BASE;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub toast: ToastConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workshop API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Data-store browser opened by the insight button
    #[serde(default = "default_insight_url")]
    pub insight_url: String,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_insight_url() -> String {
    "http://localhost:8001".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
            insight_url: default_insight_url(),
        }
    }
}

/// Polling and fetch sizes
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_limit")]
    pub category_limit: usize,

    #[serde(default = "default_limit")]
    pub merchant_limit: usize,

    #[serde(default = "default_limit")]
    pub search_limit: usize,

    /// Shorter queries are ignored
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_limit() -> usize {
    10
}

fn default_min_query_len() -> usize {
    2
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            category_limit: default_limit(),
            merchant_limit: default_limit(),
            search_limit: default_limit(),
            min_query_len: default_min_query_len(),
        }
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Toast timings, measured from when the toast is shown
#[derive(Debug, Clone, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_fade_after")]
    pub fade_after_ms: u64,

    #[serde(default = "default_remove_after")]
    pub remove_after_ms: u64,
}

fn default_fade_after() -> u64 {
    3500
}

fn default_remove_after() -> u64 {
    4000
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            fade_after_ms: default_fade_after(),
            remove_after_ms: default_remove_after(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    #[cfg(feature = "native")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    #[cfg(feature = "native")]
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    #[cfg(feature = "native")]
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("bankdash").join("config.toml")),
            Some(PathBuf::from("/etc/bankdash/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `BANKDASH_*` overrides looked up through `var`
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("BANKDASH_API_URL") {
            self.api.base_url = url;
        }
        if let Some(interval) = var("BANKDASH_POLL_INTERVAL_MS") {
            match interval.parse() {
                Ok(ms) => self.dashboard.poll_interval_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid BANKDASH_POLL_INTERVAL_MS={}", interval),
            }
        }
        if let Some(level) = var("BANKDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BANKDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Bankdash Configuration
#
# Environment variables override these settings:
# - BANKDASH_API_URL
# - BANKDASH_POLL_INTERVAL_MS
# - BANKDASH_LOG_LEVEL
# - BANKDASH_LOG_FORMAT

[api]
# Workshop API base URL
base_url = "http://localhost:8000"

# Request timeout (ms)
request_timeout_ms = 10000

# Opened by the insight button
insight_url = "http://localhost:8001"

[dashboard]
# How often to check which modules are unlocked (ms)
poll_interval_ms = 2000

# Rows requested from each endpoint
category_limit = 10
merchant_limit = 10
search_limit = 10

# Shorter search queries are ignored
min_query_len = 2

[toast]
# Fade out and removal, measured from when the toast appears (ms)
fade_after_ms = 3500
remove_after_ms = 4000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
