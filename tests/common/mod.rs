//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Submission fixtures
//! - On-disk queue databases in temporary directories
//! - Agent configuration pointed at a mock server

pub mod fixtures;
pub mod queue;

pub use fixtures::*;
pub use queue::*;
