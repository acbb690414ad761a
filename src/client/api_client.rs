//! Submissions API Client
//!
//! Async access to the create and verify endpoints. The [`SurveyApi`] trait is
//! the seam the offline layer talks through; [`HttpSurveyApi`] is the reqwest
//! implementation used in the field.
//!
//! The client reports what happened on the wire and nothing more: an HTTP
//! status with its body, or a [`TransportError`] when no response arrived.
//! Deciding what a status means is the dispatcher's job.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::client::config::Config;
use crate::shared::api::{
    CreateSubmissionResponse, ProductCatalogue, VerifyRequest, VerifyResponse,
    IDEMPOTENCY_KEY_HEADER,
};
use crate::shared::SubmissionDraft;

/// Substrings that mark a failure of the secure channel rather than of the
/// connection attempt. Such a failure can happen after the server has read
/// the whole request.
const SECURE_CHANNEL_MARKERS: &[&str] = &["ssl", "tls", "handshake"];

/// A request that produced no HTTP response
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Flatten a reqwest error and its whole source chain into one message
    ///
    /// The request URL is stripped first: a host or path containing `tls`
    /// must not read as a secure-channel failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the message points at the TLS layer
    pub fn is_secure_channel_failure(&self) -> bool {
        let lower = self.message.to_lowercase();
        SECURE_CHANNEL_MARKERS.iter().any(|marker| lower.contains(marker))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

/// Raw answer of the create endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReply {
    pub status: u16,
    pub body: CreateSubmissionResponse,
}

/// Remote collaborator used by the offline layer
#[async_trait]
pub trait SurveyApi: Send + Sync {
    /// POST the draft to the create endpoint
    async fn create_submission(
        &self,
        request_id: &str,
        draft: &SubmissionDraft,
    ) -> Result<CreateReply, TransportError>;

    /// Ask whether a submission exists for the outlet on the given day
    async fn verify_submission(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError>;
}

/// reqwest-backed submissions API client
#[derive(Debug, Clone)]
pub struct HttpSurveyApi {
    config: Config,
    client: Client,
}

impl HttpSurveyApi {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Fetch the product catalogue
    pub async fn fetch_products(&self) -> Result<ProductCatalogue, TransportError> {
        let url = self.config.api_url("/api/products");
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::new(format!(
                "catalogue request failed with status {}",
                response.status()
            )));
        }
        Ok(response.json::<ProductCatalogue>().await?)
    }

    /// One-shot reachability check used to seed connectivity at startup
    pub async fn probe(&self) -> bool {
        match self.fetch_products().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("[API] Reachability probe failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl SurveyApi for HttpSurveyApi {
    async fn create_submission(
        &self,
        request_id: &str,
        draft: &SubmissionDraft,
    ) -> Result<CreateReply, TransportError> {
        let url = self.config.api_url("/api/submissions");

        let response = self
            .client
            .post(&url)
            .header(IDEMPOTENCY_KEY_HEADER, request_id)
            .json(draft)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        // Proxies answer with HTML; keep the text so the failure is still readable.
        let body = serde_json::from_str::<CreateSubmissionResponse>(&text)
            .unwrap_or_else(|_| CreateSubmissionResponse::failed(text));

        tracing::debug!("[API] POST {} -> {}", url, status);
        Ok(CreateReply { status, body })
    }

    async fn verify_submission(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError> {
        let url = self.config.api_url("/api/submissions/verify");

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(TransportError::new(format!(
                "verify failed: {} - {}",
                status, error_text
            )));
        }

        Ok(response.json::<VerifyResponse>().await?)
    }
}
