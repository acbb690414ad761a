//! Field Agent Client Module
//!
//! Everything that runs on the agent's device: the offline-first submission
//! layer and the capabilities it depends on.
//!
//! # Architecture
//!
//! - **`config`** - Server URL and queue location
//! - **`api_client`** - HTTP access to the create/verify endpoints
//! - **`geolocation`** - Single-shot location fixes
//! - **`local_db`** - SQLite-backed durable queue
//! - **`sync`** - Connectivity monitor and drain phase
//! - **`offline`** - Queue, dispatcher, reconciliation and the [`OfflineManager`]
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs
//! ├── config.rs
//! ├── api_client.rs
//! ├── geolocation.rs
//! ├── local_db/
//! ├── offline/
//! └── sync/
//! ```

pub mod api_client;
pub mod config;
pub mod geolocation;
pub mod local_db;
pub mod offline;
pub mod sync;

// Re-export commonly used types
pub use api_client::{HttpSurveyApi, SurveyApi, TransportError};
pub use config::Config;
pub use geolocation::{GeoError, LocationProvider};
pub use local_db::LocalDatabase;
pub use offline::{DrainReport, OfflineError, OfflineManager, SubmitOutcome};
pub use sync::ConnectivityMonitor;
