//! Queue database helpers for integration tests

use tempfile::TempDir;

use price_survey::client::local_db::LocalDatabase;

/// A queue database in its own temporary directory
///
/// The directory is removed when the value is dropped.
pub struct TestQueue {
    pub dir: TempDir,
    pub db: LocalDatabase,
}

impl TestQueue {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = LocalDatabase::open(&dir.path().join("queue.db"))
            .await
            .expect("Failed to open queue database");
        Self { dir, db }
    }

    /// Open a second handle on the same file, as a restarted agent would
    pub async fn reopen(&self) -> LocalDatabase {
        LocalDatabase::open(&self.dir.path().join("queue.db"))
            .await
            .expect("Failed to reopen queue database")
    }
}
