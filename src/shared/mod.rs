//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the field agent and the submissions server. These types are used for
//! serialization and communication over the submissions API.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All types are designed for serialization
//! and transmission over HTTP.

/// Survey submission model and validation rules
pub mod submission;

/// Request/response bodies of the submissions API
pub mod api;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use submission::{GeoFix, ProductLine, ProductName, SubmissionDraft};
pub use error::{SharedError, ValidationIssue};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
