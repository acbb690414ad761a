//! # Delivery Reconciliation
//!
//! Settles attempts whose outcome is unknown. When the secure channel dies
//! mid-request the server may already have stored the record, so the verify
//! endpoint is asked whether the outlet has a submission for the collection
//! day before anything is retried.
//!
//! Only a positive answer counts as delivery. A negative answer, or a verify
//! call that fails, leaves the record to be retried.

use std::fmt;
use std::sync::Arc;

use crate::client::api_client::SurveyApi;
use crate::shared::api::VerifyRequest;
use crate::shared::SubmissionDraft;

/// What the verify endpoint said about a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationResult {
    /// The server holds a submission for the outlet and day
    Confirmed { id: Option<String> },
    /// The server holds no such submission
    NotFound,
    /// The verify call failed; nothing is known
    Unverified { reason: String },
}

impl ReconciliationResult {
    pub fn exists(&self) -> bool {
        matches!(self, ReconciliationResult::Confirmed { .. })
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationResult::Confirmed { .. } => write!(f, "confirmed on server"),
            ReconciliationResult::NotFound => write!(f, "not found on server"),
            ReconciliationResult::Unverified { reason } => write!(f, "verification failed: {}", reason),
        }
    }
}

/// Queries the verify endpoint
#[derive(Clone)]
pub struct Reconciler {
    api: Arc<dyn SurveyApi>,
}

impl Reconciler {
    pub fn new(api: Arc<dyn SurveyApi>) -> Self {
        Self { api }
    }

    /// Ask whether `outlet_name` has a submission on `day` (`YYYY-MM-DD`)
    pub async fn reconcile(&self, outlet_name: &str, day: &str) -> ReconciliationResult {
        let request = VerifyRequest {
            outlet_name: outlet_name.to_string(),
            day: day.to_string(),
        };

        let result = match self.api.verify_submission(&request).await {
            Ok(response) if !response.ok => ReconciliationResult::Unverified {
                reason: response.error.unwrap_or_else(|| "verify reported failure".to_string()),
            },
            Ok(response) if response.exists => ReconciliationResult::Confirmed { id: response.id },
            Ok(_) => ReconciliationResult::NotFound,
            Err(e) => ReconciliationResult::Unverified {
                reason: e.to_string(),
            },
        };

        tracing::info!("[RECONCILE] '{}' on {}: {}", outlet_name, day, result);
        result
    }

    /// Reconcile using the draft's outlet and collection day
    pub async fn reconcile_draft(&self, draft: &SubmissionDraft) -> ReconciliationResult {
        self.reconcile(&draft.outlet_name, &draft.collection_day()).await
    }
}
