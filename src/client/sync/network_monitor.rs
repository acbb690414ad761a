//! # Network Monitor
//!
//! Tracks whether the device is online. The runtime pushes transitions in
//! through [`ConnectivityMonitor::set_online`]; nothing is polled. Interested
//! tasks subscribe to a watch channel and are woken only on real changes, so
//! repeating the current state is a no-op for subscribers.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl From<bool> for NetworkStatus {
    fn from(online: bool) -> Self {
        if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        }
    }
}

/// Process-wide connectivity state
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    sender: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    /// Seed the monitor with the runtime's current reachability
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn status(&self) -> NetworkStatus {
        self.is_online().into()
    }

    /// Apply a transition event; returns `true` when the state changed
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!("[NETWORK] Now {:?}", NetworkStatus::from(online));
        }
        changed
    }

    /// Receive every future transition
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
