//! Domain events emitted by the sync engine.
//!
//! Events are broadcast by the sync service and consumed by whatever
//! front end hosts the engine: status indicators, notices, and dialogs
//! subscribe here instead of reaching into engine internals.

pub mod space;
pub mod sync;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use space::SpaceEvent;
pub use sync::SyncStateEvent;

/// Wrapper for all engine events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all engine event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A space membership or sharing event.
    Space(SpaceEvent),
    /// A sync state transition or push outcome.
    Sync(SyncStateEvent),
}

impl SyncEvent {
    /// Create a new engine event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

impl From<SpaceEvent> for SyncEvent {
    fn from(event: SpaceEvent) -> Self {
        Self::new(EventPayload::Space(event))
    }
}

impl From<SyncStateEvent> for SyncEvent {
    fn from(event: SyncStateEvent) -> Self {
        Self::new(EventPayload::Sync(event))
    }
}
