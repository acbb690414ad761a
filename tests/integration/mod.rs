//! Integration tests
//!
//! Agent-side tests run against wiremock; server tests drive the real router.

mod api_client_test;
mod offline_flow_test;
#[cfg(feature = "ssr")]
mod end_to_end_test;
