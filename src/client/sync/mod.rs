//! # Sync Coordination
//!
//! Connectivity tracking and the drain phase flag. The offline manager reads
//! both before touching the network: connectivity gates every attempt, and
//! the phase flag keeps drains from overlapping.

pub mod network_monitor;
pub mod sync_state;

pub use network_monitor::{ConnectivityMonitor, NetworkStatus};
pub use sync_state::{DrainGuard, DrainPhase, DrainState};
