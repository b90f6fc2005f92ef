//! # Persistent Configuration Store
//!
//! The transmit-enable flag survives reboots so that a commanded RF mute
//! stays in effect across resets. On the flight hardware the flag lives in
//! the FRAM-backed persistent variable store; this crate only consumes it
//! through a trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Access to the persisted radio settings
pub trait PersistentStore {
    /// Load the transmit-enable flag
    fn load_tx_enabled(&self) -> bool;

    /// Store the transmit-enable flag
    fn store_tx_enabled(&mut self, enabled: bool);
}

/// In-memory store for tests and host builds.
///
/// Clones share the same flag, so a test can keep a handle while the driver
/// owns another.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tx_enabled: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new(tx_enabled: bool) -> Self {
        Self {
            tx_enabled: Arc::new(AtomicBool::new(tx_enabled)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PersistentStore for InMemoryStore {
    fn load_tx_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Relaxed)
    }

    fn store_tx_enabled(&mut self, enabled: bool) {
        self.tx_enabled.store(enabled, Ordering::Relaxed);
    }
}
