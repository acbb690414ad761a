//! Backend Error Module
//!
//! Error types for the submissions server. Handlers return
//! `Result<_, BackendError>` and the error renders itself as a JSON response.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! Expected outcomes of a request (duplicate outlet, invalid payload) are not
//! errors here; handlers answer them with their own status and body. This type
//! covers what went wrong on the server side, plus malformed requests the
//! handlers refuse outright.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
