//! # Drain State
//!
//! Idle/Draining flag guarding the queue drain. Entering `Draining` is a
//! single compare-and-swap, so no task can slip in between the check and the
//! set. The returned guard puts the flag back to `Idle` when dropped, even if
//! the drain bails out early with an error.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPhase {
    Idle,
    Draining,
}

#[derive(Debug, Default)]
pub struct DrainState {
    draining: AtomicBool,
}

impl DrainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DrainPhase {
        if self.draining.load(Ordering::Acquire) {
            DrainPhase::Draining
        } else {
            DrainPhase::Idle
        }
    }

    /// Move Idle -> Draining, or return `None` if a drain is already running
    pub fn try_begin(&self) -> Option<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard { state: self })
    }
}

/// Holds the Draining phase until dropped
#[derive(Debug)]
pub struct DrainGuard<'a> {
    state: &'a DrainState,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.state.draining.store(false, Ordering::Release);
    }
}
