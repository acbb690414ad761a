//! # Local Database Module
//!
//! SQLite storage for the submission queue. Queued records must outlive the
//! process: an agent can capture a morning of prices offline, close the app,
//! and drain the queue when signal returns.
//!
//! ## Key Components
//!
//! - `LocalDatabase`: Connection pool and schema management
//! - `migrations/`: Embedded schema migrations
//! - `pending.rs`: [`QueueStore`](crate::client::offline::queue::QueueStore) implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use price_survey::client::local_db::LocalDatabase;
//! use price_survey::client::offline::queue::SubmissionQueue;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = LocalDatabase::new().await?;
//! let queue = SubmissionQueue::new(Arc::new(db));
//! println!("{} pending", queue.count().await?);
//! # Ok(())
//! # }
//! ```

pub mod pending;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Result as SqlxResult, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Result type for local database operations
pub type Result<T> = SqlxResult<T>;

/// Local database connection manager
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the database at the platform data directory
    pub async fn new() -> Result<Self> {
        Self::open(Self::get_db_path()).await
    }

    /// Open or create the database at `path`
    ///
    /// Uses WAL mode so readers never block the drain's writes.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::info!("[LOCAL_DB] Opened queue database at {}", path.display());
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Volatile database; contents vanish with the value
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // Every connection to :memory: is a separate database, so pin one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Platform-specific path for the queue database
    pub fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("price-survey");
        path.push("queue.db");
        path
    }

    /// Applies the embedded migrations; already-applied ones are skipped
    async fn init_schema(&self) -> Result<()> {
        sqlx::migrate!("src/client/local_db/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of rows in the queue table
    pub async fn pending_rows(&self) -> Result<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0.max(0) as u64)
    }

    /// Number of applied schema migrations
    pub async fn applied_migrations(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
