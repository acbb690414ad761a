//! Submission HTTP Handlers
//!
//! Create, verify and list price submissions, plus the product catalogue.
//! Duplicates and invalid payloads are normal answers with their own status
//! codes; only server-side failures go through [`BackendError`].

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use super::db;
use super::filter::{ListParams, SubmissionFilter};
use crate::backend::error::BackendError;
use crate::shared::api::{
    ClientMeta, CreateSubmissionResponse, ListSubmissionsResponse, ProductCatalogue, VerifyRequest,
    VerifyResponse, IDEMPOTENCY_KEY_HEADER,
};
use crate::shared::{SubmissionDraft, ValidationIssue};

const DUPLICATE_MESSAGE: &str = "Already captured for this outlet today";
const PLATFORM_HEADER: &str = "sec-ch-ua-platform";

type CreateResult = Result<(StatusCode, Json<CreateSubmissionResponse>), BackendError>;

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(errors: Vec<ValidationIssue>) -> CreateResult {
    Ok((
        StatusCode::BAD_REQUEST,
        Json(CreateSubmissionResponse::invalid(errors)),
    ))
}

/// Parse the body into a draft, defaulting `collectedAt` to now
fn parse_draft(mut payload: Value) -> Result<SubmissionDraft, ValidationIssue> {
    if let Some(object) = payload.as_object_mut() {
        let missing = object.get("collectedAt").map_or(true, Value::is_null);
        if missing {
            object.insert(
                "collectedAt".to_string(),
                Value::String(Utc::now().fixed_offset().to_rfc3339()),
            );
        }
    }
    serde_json::from_value(payload).map_err(|e| ValidationIssue::new("body", e.to_string()))
}

/// `POST /api/submissions`
pub async fn create_submission(
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> CreateResult {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return invalid(vec![ValidationIssue::new("body", rejection.body_text())]);
        }
    };

    let draft = match parse_draft(payload) {
        Ok(draft) => draft.normalized(),
        Err(issue) => return invalid(vec![issue]),
    };
    if let Err(err) = draft.validate() {
        tracing::debug!("[SUBMISSIONS] Rejected '{}': {}", draft.outlet_name, err);
        return invalid(err.issues().to_vec());
    }

    let idempotency_key = header_text(&headers, IDEMPOTENCY_KEY_HEADER);
    let client_meta = ClientMeta {
        user_agent: header_text(&headers, USER_AGENT.as_str()).unwrap_or_default(),
        platform: header_text(&headers, PLATFORM_HEADER)
            .map(|p| p.trim_matches('"').to_string())
            .unwrap_or_default(),
    };

    match db::insert_submission(&pool, &draft, idempotency_key.as_deref(), &client_meta).await {
        Ok(id) => {
            tracing::info!(
                "[SUBMISSIONS] Stored {} for '{}' on {}",
                id,
                draft.outlet_name,
                draft.collection_day()
            );
            Ok((
                StatusCode::CREATED,
                Json(CreateSubmissionResponse::created(id)),
            ))
        }
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!(
                "[SUBMISSIONS] Duplicate for '{}' on {} (key {:?})",
                draft.outlet_name,
                draft.collection_day(),
                idempotency_key
            );
            Ok((
                StatusCode::CONFLICT,
                Json(CreateSubmissionResponse::duplicate(DUPLICATE_MESSAGE)),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /api/submissions/verify`
pub async fn verify_submission(
    State(pool): State<SqlitePool>,
    Json(request): Json<VerifyRequest>,
) -> Result<(StatusCode, Json<VerifyResponse>), BackendError> {
    let outlet_name = request.outlet_name.trim();
    let day = request.day.trim();

    if outlet_name.is_empty() || day.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(VerifyResponse {
                ok: false,
                error: Some("Missing outletName or day".to_string()),
                ..Default::default()
            }),
        ));
    }

    let id = db::find_by_outlet_day(&pool, outlet_name, day).await?;
    tracing::debug!("[SUBMISSIONS] Verify '{}' on {}: {:?}", outlet_name, day, id);

    Ok((
        StatusCode::OK,
        Json(VerifyResponse {
            ok: true,
            exists: id.is_some(),
            id,
            error: None,
        }),
    ))
}

/// `GET /api/submissions`
pub async fn list_submissions(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListSubmissionsResponse>, BackendError> {
    let filter = SubmissionFilter::try_from(params)?;
    let items = db::list_submissions(&pool, &filter).await?;

    Ok(Json(ListSubmissionsResponse {
        ok: true,
        total: items.len(),
        items,
    }))
}

/// `GET /api/products`
pub async fn list_products() -> Json<ProductCatalogue> {
    Json(ProductCatalogue::default())
}
