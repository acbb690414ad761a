/**
 * Server Configuration
 *
 * Loads server settings from the environment and opens the submissions
 * database.
 *
 * # Configuration Sources
 *
 * - `DATABASE_URL` - SQLite URL, default `sqlite:price-survey.db`
 * - `SERVER_PORT` - listen port, default 3000
 *
 * Unlike optional services, the record store is required: the server refuses
 * to start without it.
 */

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::backend::error::BackendError;
use crate::shared::ConfigError;

/// Database used when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite:price-survey.db";

/// Port used when `SERVER_PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Settings read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `DATABASE_URL` and `SERVER_PORT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("SERVER_PORT").ok(),
        )
    }

    fn from_values(database_url: Option<String>, port: Option<String>) -> Result<Self, ConfigError> {
        let port = match port {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                field: "SERVER_PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: database_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port,
        })
    }
}

/// Open the submissions database and apply migrations
///
/// File databases are created when missing and run in WAL mode. An in-memory
/// URL gets a single pinned connection so every request sees the same data.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, BackendError> {
    tracing::info!("Connecting to database...");

    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(8)
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        tracing::error!("Failed to create database connection pool: {:?}", e);
        e
    })?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
