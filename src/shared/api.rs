//! API Wire Types
//!
//! Request and response bodies exchanged with the submissions API. The agent
//! and the server both use these, so a field renamed here is renamed on both
//! sides of the wire.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::ValidationIssue;
use crate::shared::submission::{GeoFix, ProductLine, ProductName};

/// Machine-readable code for an outlet already captured today
pub const CODE_DUPLICATE: &str = "DUPLICATE";

/// Machine-readable code for a rejected payload
pub const CODE_VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Header carrying the client-generated request identifier
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Body returned by `POST /api/submissions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSubmissionResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateSubmissionResponse {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: Some(CODE_DUPLICATE.to_string()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn invalid(errors: Vec<ValidationIssue>) -> Self {
        Self {
            ok: false,
            code: Some(CODE_VALIDATION_ERROR.to_string()),
            errors,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Best human-readable explanation carried by the body
    pub fn describe(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        if let Some(error) = &self.error {
            return error.clone();
        }
        if !self.errors.is_empty() {
            return self
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
        }
        self.code.clone().unwrap_or_default()
    }
}

/// Body of `POST /api/submissions/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub outlet_name: String,
    /// Calendar day as `YYYY-MM-DD`
    #[serde(default)]
    pub day: String,
}

/// Answer of the verify endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
    #[serde(default)]
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client metadata recorded with each stored submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    pub user_agent: String,
    pub platform: String,
}

/// A persisted submission as listed by `GET /api/submissions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub outlet_name: String,
    pub area: String,
    #[serde(default)]
    pub geo: Option<GeoFix>,
    pub items: Vec<ProductLine>,
    pub collected_at: DateTime<FixedOffset>,
    pub day: String,
    pub client_meta: ClientMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body returned by `GET /api/submissions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSubmissionsResponse {
    pub ok: bool,
    pub items: Vec<StoredSubmission>,
    pub total: usize,
}

/// Body returned by `GET /api/products`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalogue {
    pub items: Vec<ProductName>,
}

impl Default for ProductCatalogue {
    fn default() -> Self {
        Self {
            items: ProductName::ALL.to_vec(),
        }
    }
}
