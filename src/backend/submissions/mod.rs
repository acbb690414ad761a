//! Submissions Module
//!
//! The record store behind the agent's create and verify calls, and the
//! list endpoint the dashboard reads from.
//!
//! # Module Structure
//!
//! ```text
//! submissions/
//! ├── mod.rs       - Module exports
//! ├── handlers.rs  - HTTP handlers
//! ├── filter.rs    - List query parsing
//! └── db.rs        - SQLite queries
//! ```
//!
//! One outlet gets at most one submission per collection day; the unique
//! index enforces it, and a second attempt answers 409 `DUPLICATE`.

pub mod db;
pub mod filter;
pub mod handlers;

pub use filter::{ListParams, SubmissionFilter, TimeBound, LIST_LIMIT};
