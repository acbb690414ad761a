//! # Pending Submission Storage
//!
//! Queue rows keep the draft as a JSON payload and the retry bookkeeping in
//! plain columns, so a retry update never rewrites the payload. Listing is
//! ordered by the autoincrement `seq`, which preserves insertion order even
//! when two records share an enqueue timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::client::local_db::LocalDatabase;
use crate::client::offline::queue::{PendingSubmission, QueueStore, StoreError};
use crate::shared::SubmissionDraft;

fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            source: Box::new(e),
        })
}

fn row_to_pending(row: &SqliteRow) -> Result<PendingSubmission, StoreError> {
    let id: String = row.try_get("id")?;
    let payload: String = row.try_get("payload")?;
    let draft: SubmissionDraft = serde_json::from_str(&payload).map_err(|e| StoreError::Corrupt {
        id: id.clone(),
        source: Box::new(e),
    })?;

    let enqueued_at: String = row.try_get("enqueued_at")?;
    let last_attempt_at: Option<String> = row.try_get("last_attempt_at")?;
    let retry_count: i64 = row.try_get("retry_count")?;

    Ok(PendingSubmission {
        enqueued_at: parse_timestamp(&id, &enqueued_at)?,
        last_attempt_at: last_attempt_at
            .as_deref()
            .map(|raw| parse_timestamp(&id, raw))
            .transpose()?,
        retry_count: retry_count.max(0) as u32,
        last_error: row.try_get("last_error")?,
        draft,
        id,
    })
}

#[async_trait]
impl QueueStore for LocalDatabase {
    async fn insert(&self, record: &PendingSubmission) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&record.draft)?;

        let result = sqlx::query(
            "INSERT INTO pending_submissions
                (id, payload, enqueued_at, retry_count, last_attempt_at, last_error)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&payload)
        .bind(record.enqueued_at.to_rfc3339())
        .bind(i64::from(record.retry_count))
        .bind(record.last_attempt_at.map(|t| t.to_rfc3339()))
        .bind(&record.last_error)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateId(record.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, record: &PendingSubmission) -> Result<bool, StoreError> {
        let payload = serde_json::to_string(&record.draft)?;

        let result = sqlx::query(
            "UPDATE pending_submissions SET
                payload = ?,
                retry_count = ?,
                last_attempt_at = ?,
                last_error = ?
             WHERE id = ?",
        )
        .bind(&payload)
        .bind(i64::from(record.retry_count))
        .bind(record.last_attempt_at.map(|t| t.to_rfc3339()))
        .bind(&record.last_error)
        .bind(&record.id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pending_submissions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_all(&self) -> Result<Vec<PendingSubmission>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, payload, enqueued_at, retry_count, last_attempt_at, last_error
             FROM pending_submissions
             ORDER BY seq ASC",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_pending).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.pending_rows().await? as usize)
    }
}
