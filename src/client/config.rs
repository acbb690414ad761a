use std::path::PathBuf;

use crate::client::local_db::LocalDatabase;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Agent configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                server_url: Some(DEFAULT_SERVER_URL.to_string()),
                ..AppConfig::default()
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `SURVEY_API_URL` and `SURVEY_QUEUE_PATH`, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_url = std::env::var("SURVEY_API_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let mut builder = AppConfig::builder().server_url(server_url);
        if let Ok(path) = std::env::var("SURVEY_QUEUE_PATH") {
            builder = builder.queue_path(path);
        }
        Self::with_builder(builder)
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self { app })
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Where the local queue database lives
    pub fn queue_path(&self) -> PathBuf {
        self.app
            .queue_path
            .clone()
            .unwrap_or_else(LocalDatabase::get_db_path)
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }
}
