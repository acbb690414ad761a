//! Route Configuration Module
//!
//! HTTP routes for the submissions server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and middleware
//! └── api_routes.rs   - Submission and product endpoints
//! ```
//!
//! # Routes
//!
//! - `POST /api/submissions` - Store a submission
//! - `GET /api/submissions` - List submissions with filters
//! - `POST /api/submissions/verify` - Does an outlet have a submission on a day
//! - `GET /api/products` - Product catalogue

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
