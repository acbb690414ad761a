//! # Retry Accounting
//!
//! Bounded retries for queued submissions. Every failed attempt bumps the
//! record's counter; once it reaches the ceiling the record is given up on
//! and reported instead of being retried forever.

use chrono::Utc;

use crate::client::offline::queue::PendingSubmission;
use crate::shared::config::DEFAULT_MAX_RETRIES;

/// What to do with a record after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Keep it queued for a later drain
    Requeue,
    /// Drop it; the ceiling was reached after `attempts` failures
    Exhausted { attempts: u32 },
}

/// Retry ceiling for queued submissions
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Record a failed attempt on `record` and decide its fate
    pub fn record_failure(&self, record: &mut PendingSubmission, reason: &str) -> RetryDecision {
        record.retry_count += 1;
        record.last_attempt_at = Some(Utc::now());
        record.last_error = Some(reason.to_string());

        if record.retry_count >= self.max_attempts {
            RetryDecision::Exhausted {
                attempts: record.retry_count,
            }
        } else {
            RetryDecision::Requeue
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
