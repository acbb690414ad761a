//! Property-based tests
//!
//! Uses proptest to check submission rules and queue behavior over generated inputs

mod queue_proptest;
mod submission_proptest;
