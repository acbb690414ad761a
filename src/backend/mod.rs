//! Backend Module
//!
//! Server-side code for the price survey: the submissions API the field
//! agents deliver to, backed by SQLite.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`submissions`** - Create/verify/list handlers and queries
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - survey-server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── submissions/    - Submission handlers and storage
//! └── error/          - Error types
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use price_survey::backend::server::{create_app, load_database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = load_database("sqlite:price-survey.db").await?;
//! let app = create_app(pool);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Submission handlers and storage
pub mod submissions;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::create_app;
