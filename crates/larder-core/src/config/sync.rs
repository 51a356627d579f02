//! Sync engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the sync pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Capacity of the engine event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Capacity of each remote snapshot broadcast channel.
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            snapshot_capacity: default_snapshot_capacity(),
        }
    }
}

fn default_event_capacity() -> usize {
    64
}

fn default_snapshot_capacity() -> usize {
    32
}
