//! Space entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::types::{SpaceId, UserId};

/// The remote sharing unit. One space per owner, keyed by the owner's id.
///
/// A space owns sub-collections of remote items, recipes, and members.
/// While `sharing_paused` is set, members are read-only and are expected
/// to switch back to their own space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Space identifier (the owner's user id).
    pub id: SpaceId,
    /// The owning user.
    pub owner_id: UserId,
    /// Owner's email, for display in member lists.
    pub owner_email: String,
    /// Owner's display name, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_display_name: Option<String>,
    /// Ids of every member, the owner included.
    pub member_ids: Vec<UserId>,
    /// Whether the owner has paused sharing.
    pub sharing_paused: bool,
    /// When the space was created.
    pub created_at: DateTime<Utc>,
}

impl Space {
    /// Create a space owned by the given user.
    pub fn new(owner_id: UserId, owner_email: impl Into<String>) -> Self {
        Self {
            id: SpaceId::from(owner_id),
            owner_id,
            owner_email: owner_email.into(),
            owner_display_name: None,
            member_ids: vec![owner_id],
            sharing_paused: false,
            created_at: Utc::now(),
        }
    }

    /// Whether the given user belongs to this space.
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Whether the given user owns this space.
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Add a member id if not already present.
    pub fn add_member(&mut self, user_id: UserId) {
        if !self.is_member(user_id) {
            self.member_ids.push(user_id);
        }
    }

    /// Remove a member id. The owner cannot be removed.
    pub fn remove_member(&mut self, user_id: UserId) {
        if user_id != self.owner_id {
            self.member_ids.retain(|id| *id != user_id);
        }
    }
}
