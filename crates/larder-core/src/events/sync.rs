//! Sync state transitions and push outcomes.

use serde::{Deserialize, Serialize};

use crate::types::SyncStatus;

/// Events about the sync pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncStateEvent {
    /// The device's sync status changed.
    StatusChanged {
        /// The new status.
        status: SyncStatus,
    },
    /// An authoritative remote snapshot replaced a local collection.
    SnapshotApplied {
        /// Which collection was replaced (`"items"` or `"recipes"`).
        collection: String,
        /// Number of documents in the snapshot.
        count: usize,
    },
    /// An outbound push failed. Silent by design at the UI layer; the
    /// event exists for diagnostics surfaces.
    PushFailed {
        /// Which collection the push targeted.
        collection: String,
        /// Human-readable reason.
        reason: String,
    },
}
