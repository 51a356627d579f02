//! Space membership and sharing events.

use serde::{Deserialize, Serialize};

use crate::types::{SpaceId, UserId};

/// Events about the device's relationship to shared spaces.
///
/// These are the user-visible notices of the sharing subsystem; the host
/// application decides how (or whether) to render each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpaceEvent {
    /// Sharing was enabled and the local data uploaded to the user's space.
    SharingEnabled {
        /// The space the device is now bound to.
        space_id: SpaceId,
    },
    /// Sharing was disabled; the device returned to local-only mode.
    SharingDisabled,
    /// The bound space was paused by its owner; the device was switched
    /// back to the user's own space.
    EvictedFromPausedSpace {
        /// The space that was paused.
        space_id: SpaceId,
    },
    /// The bound space disappeared from the user's space list (membership
    /// revoked or space deleted); the device was switched back home.
    EvictedFromLostSpace {
        /// The space that is no longer available.
        space_id: SpaceId,
    },
    /// The device switched to a different space.
    SwitchedSpace {
        /// The newly bound space.
        space_id: SpaceId,
    },
    /// A member was removed from a space owned by this user.
    MemberRemoved {
        /// The space the member was removed from.
        space_id: SpaceId,
        /// The removed member.
        user_id: UserId,
    },
}
