//! Application configuration module
//!
//! Provides the configuration types shared by the agent and its tooling.
//! Values are assembled through [`AppConfigBuilder`] and validated once on
//! `build()`, so everything downstream can rely on them.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Attempts a queued submission gets before it is dropped as a permanent failure
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause after coming back online before the queue is drained
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for a single location request
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Retry ceiling for queued submissions
    pub max_retries: u32,
    /// Debounce applied to offline -> online transitions
    pub settle_delay: Duration,
    /// Timeout for one geolocation request
    pub location_timeout: Duration,
    /// Location of the local queue database; `None` uses the platform data dir
    pub queue_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            max_retries: DEFAULT_MAX_RETRIES,
            settle_delay: DEFAULT_SETTLE_DELAY,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            queue_path: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    max_retries: Option<u32>,
    settle_delay: Option<Duration>,
    location_timeout: Option<Duration>,
    queue_path: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    pub fn location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = Some(timeout);
        self
    }

    pub fn queue_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.queue_path = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            server_url: self.server_url,
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            settle_delay: self.settle_delay.unwrap_or(defaults.settle_delay),
            location_timeout: self.location_timeout.unwrap_or(defaults.location_timeout),
            queue_path: self.queue_path,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
