//! # Submission Queue
//!
//! Holds submissions that could not be delivered yet. The queue survives
//! restarts when backed by the SQLite store in `local_db`; an in-memory store
//! is provided for ephemeral sessions and tests.
//!
//! ## Features
//!
//! - **Persistent Queue**: Records survive app restarts
//! - **Stable Order**: Records are listed in insertion order
//! - **Idempotent Removal**: Removing an unknown id is a no-op
//! - **Loud Failures**: A record that cannot be persisted is an error for the caller
//!
//! ## Usage
//!
//! ```rust,no_run
//! use price_survey::client::offline::queue::{MemoryQueueStore, SubmissionQueue};
//! use std::sync::Arc;
//!
//! # async fn example(draft: price_survey::shared::SubmissionDraft) -> Result<(), Box<dyn std::error::Error>> {
//! let queue = SubmissionQueue::new(Arc::new(MemoryQueueStore::new()));
//!
//! let id = queue.enqueue(draft).await?;
//! assert_eq!(queue.count().await?, 1);
//!
//! queue.remove(&id).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::shared::SubmissionDraft;

/// A submission waiting in the local queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    /// Locally generated identifier
    pub id: String,
    /// The payload as authored by the agent
    #[serde(flatten)]
    pub draft: SubmissionDraft,
    /// When the record entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Failed delivery attempts so far
    pub retry_count: u32,
    /// Timestamp of last attempt
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Error message from last failure
    #[serde(default)]
    pub last_error: Option<String>,
}

impl PendingSubmission {
    /// Wrap a draft with a fresh identifier and a zero retry counter
    pub fn new(draft: SubmissionDraft) -> Self {
        let now = Utc::now();
        Self {
            id: generate_pending_id(now),
            draft,
            enqueued_at: now,
            retry_count: 0,
            last_attempt_at: None,
            last_error: None,
        }
    }
}

/// `pending_<epoch millis>_<9 hex chars>`
fn generate_pending_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("pending_{}_{}", now.timestamp_millis(), &suffix[..9])
}

/// Local persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row that no longer decodes: bad payload JSON or timestamp
    #[error("corrupt queue record {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("a queued submission with id {0} already exists")]
    DuplicateId(String),

    /// The backing store refused the operation, e.g. it is full
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence backend for the queue
///
/// Implementations must list records in insertion order.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Persist a new record
    async fn insert(&self, record: &PendingSubmission) -> Result<(), StoreError>;

    /// Overwrite an existing record; returns `false` when the id is unknown
    async fn replace(&self, record: &PendingSubmission) -> Result<bool, StoreError>;

    /// Delete a record; returns `false` when the id is unknown
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// All records, oldest first
    async fn load_all(&self) -> Result<Vec<PendingSubmission>, StoreError>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Volatile store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    records: RwLock<VecDeque<PendingSubmission>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn insert(&self, record: &PendingSubmission) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateId(record.id.clone()));
        }
        records.push_back(record.clone());
        Ok(())
    }

    async fn replace(&self, record: &PendingSubmission) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn load_all(&self) -> Result<Vec<PendingSubmission>, StoreError> {
        Ok(self.records.read().await.iter().cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

/// Queue of submissions awaiting delivery
#[derive(Clone)]
pub struct SubmissionQueue {
    store: Arc<dyn QueueStore>,
}

impl std::fmt::Debug for SubmissionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionQueue").finish_non_exhaustive()
    }
}

impl SubmissionQueue {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    /// Persist a draft and return its new identifier
    pub async fn enqueue(&self, draft: SubmissionDraft) -> Result<String, StoreError> {
        self.enqueue_pending(PendingSubmission::new(draft)).await
    }

    /// Persist a record whose identifier was already handed out
    pub async fn enqueue_pending(&self, record: PendingSubmission) -> Result<String, StoreError> {
        self.store.insert(&record).await.map_err(|e| {
            tracing::error!("[QUEUE] Failed to persist submission for {}: {}", record.draft.outlet_name, e);
            e
        })?;
        tracing::info!("[QUEUE] Queued submission {} for outlet '{}'", record.id, record.draft.outlet_name);
        Ok(record.id)
    }

    /// Remove a record; unknown ids are ignored
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if self.store.delete(id).await? {
            tracing::debug!("[QUEUE] Removed {}", id);
        }
        Ok(())
    }

    /// Replace a record in place; unknown ids are ignored
    pub async fn update(&self, record: &PendingSubmission) -> Result<(), StoreError> {
        if !self.store.replace(record).await? {
            tracing::debug!("[QUEUE] Skipped update of unknown record {}", record.id);
        }
        Ok(())
    }

    /// Every queued record in insertion order
    pub async fn list_all(&self) -> Result<Vec<PendingSubmission>, StoreError> {
        self.store.load_all().await
    }

    /// Look up a single record
    pub async fn get(&self, id: &str) -> Result<Option<PendingSubmission>, StoreError> {
        Ok(self.store.load_all().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.store.count().await
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.count().await? == 0)
    }
}
