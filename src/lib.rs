//! Price Survey - Main Library
//!
//! Field agents record the buy and sell prices of soft drinks at retail
//! outlets. Signal in the field is unreliable, so submissions go through an
//! offline-first layer that queues them durably, delivers them when the
//! network returns, and never stores the same outlet visit twice.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and backend
//!   - Submission model and validation
//!   - Create/verify/list wire types
//!   - Error and configuration types
//!
//! - **`client`** - Agent-side offline submission layer
//!   - Durable queue (SQLite or in-memory)
//!   - Connectivity monitor and automatic drain
//!   - Dispatcher, reconciliation and retry accounting
//!
//! - **`backend`** - Submissions server (only compiled with `ssr` feature)
//!   - Axum handlers for create, verify, list and products
//!   - SQLite record store with one submission per outlet per day
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend modules and the `survey-server` binary
//!
//! # Usage
//!
//! ## Server-Side
//!
//! ```rust,ignore
//! use price_survey::backend::server::{create_app, load_database, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(load_database(&config.database_url).await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Client-Side
//!
//! ```rust,no_run
//! use price_survey::client::{ConnectivityMonitor, HttpSurveyApi, LocalDatabase, OfflineManager};
//! use price_survey::client::config::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let api = HttpSurveyApi::new(config.clone());
//! let connectivity = ConnectivityMonitor::new(api.probe().await);
//! let store = LocalDatabase::open(config.queue_path()).await?;
//!
//! let manager = OfflineManager::new(Arc::new(store), Arc::new(api), connectivity, config.app());
//! let report = manager.drain_all().await?;
//! println!("{} delivered", report.success_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Server**: Handlers share an `SqlitePool` through `AppState`
//! - **Client**: `OfflineManager` is `Send + Sync`; share it behind an `Arc`

/// Shared types and data structures
pub mod shared;

/// Agent-side offline submission layer
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
