//! # Submission Dispatcher
//!
//! Makes one delivery attempt and says what came of it. The dispatcher never
//! touches the queue; callers decide what to do with each [`DeliveryOutcome`].
//!
//! ## Classification
//!
//! | Wire result                                  | Outcome              |
//! |----------------------------------------------|----------------------|
//! | 2xx                                          | `Created`            |
//! | 409                                          | `Duplicate`          |
//! | 400 carrying `VALIDATION_ERROR` or issues    | `ValidationRejected` |
//! | transport error mentioning SSL/TLS/handshake | `AmbiguousFailure`   |
//! | anything else                                | `RetryableFailure`   |

use std::fmt;
use std::sync::Arc;

use crate::client::api_client::{CreateReply, SurveyApi, TransportError};
use crate::client::offline::queue::PendingSubmission;
use crate::shared::api::CODE_VALIDATION_ERROR;
use crate::shared::{SubmissionDraft, ValidationIssue};

/// Result of a single delivery attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// The server persisted the submission
    Created { id: Option<String> },
    /// The outlet was already captured for that day
    Duplicate,
    /// The payload is invalid and must not be retried
    ValidationRejected {
        message: String,
        issues: Vec<ValidationIssue>,
    },
    /// The request may or may not have been persisted
    AmbiguousFailure { reason: String },
    /// Clear failure, safe to try again
    RetryableFailure { reason: String },
}

impl DeliveryOutcome {
    /// Whether the submission is known to be on the server
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Created { .. } | DeliveryOutcome::Duplicate)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Created { id: Some(id) } => write!(f, "created ({})", id),
            DeliveryOutcome::Created { id: None } => write!(f, "created"),
            DeliveryOutcome::Duplicate => write!(f, "duplicate"),
            DeliveryOutcome::ValidationRejected { message, .. } => {
                write!(f, "rejected: {}", message)
            }
            DeliveryOutcome::AmbiguousFailure { reason } => write!(f, "ambiguous: {}", reason),
            DeliveryOutcome::RetryableFailure { reason } => write!(f, "retryable: {}", reason),
        }
    }
}

/// Classify an HTTP answer from the create endpoint
pub fn classify_reply(reply: CreateReply) -> DeliveryOutcome {
    let CreateReply { status, body } = reply;
    match status {
        200..=299 => DeliveryOutcome::Created { id: body.id },
        409 => DeliveryOutcome::Duplicate,
        400 if body.code.as_deref() == Some(CODE_VALIDATION_ERROR) || !body.errors.is_empty() => {
            DeliveryOutcome::ValidationRejected {
                message: body.describe(),
                issues: body.errors,
            }
        }
        _ => DeliveryOutcome::RetryableFailure {
            reason: format!("server answered {}: {}", status, body.describe()),
        },
    }
}

/// Classify a request that got no HTTP answer
pub fn classify_transport(err: TransportError) -> DeliveryOutcome {
    if err.is_secure_channel_failure() {
        DeliveryOutcome::AmbiguousFailure {
            reason: err.message().to_string(),
        }
    } else {
        DeliveryOutcome::RetryableFailure {
            reason: err.message().to_string(),
        }
    }
}

/// Sends submissions to the create endpoint
#[derive(Clone)]
pub struct SubmissionDispatcher {
    api: Arc<dyn SurveyApi>,
}

impl SubmissionDispatcher {
    pub fn new(api: Arc<dyn SurveyApi>) -> Self {
        Self { api }
    }

    /// Attempt delivery of a queued record
    pub async fn dispatch(&self, record: &PendingSubmission) -> DeliveryOutcome {
        self.send(&record.id, &record.draft).await
    }

    /// Attempt delivery of a draft under the given request id
    pub async fn send(&self, request_id: &str, draft: &SubmissionDraft) -> DeliveryOutcome {
        let outcome = match self.api.create_submission(request_id, draft).await {
            Ok(reply) => classify_reply(reply),
            Err(err) => classify_transport(err),
        };
        match &outcome {
            DeliveryOutcome::AmbiguousFailure { .. } | DeliveryOutcome::RetryableFailure { .. } => {
                tracing::warn!("[DISPATCH] {} for '{}': {}", request_id, draft.outlet_name, outcome);
            }
            _ => tracing::debug!("[DISPATCH] {} for '{}': {}", request_id, draft.outlet_name, outcome),
        }
        outcome
    }
}
