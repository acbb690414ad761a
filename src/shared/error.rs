//! Shared Error Types
//!
//! This module defines error types that are shared between the agent and the server.
//! These errors represent failure cases that both sides detect the same way.
//!
//! # Error Categories
//!
//! - `ValidationError` - One or more fields of a submission are unacceptable
//!
//! # Usage
//!
//! ```rust
//! use price_survey::shared::error::SharedError;
//!
//! let error = SharedError::validation("outletName", "Outlet name must be at least 2 characters");
//! assert_eq!(error.issues().len(), 1);
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Wire path of the offending field, e.g. `items.0.buyPrice`
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Shared error types that can occur on both sides
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error: {}", summarize(.issues))]
    ValidationError {
        /// Every rule the payload broke
        issues: Vec<ValidationIssue>,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl SharedError {
    /// Create a validation error for a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            issues: vec![ValidationIssue::new(field, message)],
        }
    }

    /// Create a validation error from a list of issues
    pub fn invalid(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError { issues }
    }

    /// Validation issues carried by this error
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::ValidationError { issues } => issues,
        }
    }
}
