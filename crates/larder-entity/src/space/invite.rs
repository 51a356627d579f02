//! Space invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::types::{InviteId, SpaceId, UserId};

/// Lifecycle status of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Sent, not yet answered.
    Pending,
    /// The invitee joined the space.
    Accepted,
    /// The invitee declined, or acceptance failed defensively.
    Declined,
}

/// An invitation for a user (by email) to join a space.
///
/// Created by the inviter; mutated only via accept/decline/cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    /// Unique invite identifier.
    pub id: InviteId,
    /// The space the invitee is asked to join.
    pub space_id: SpaceId,
    /// The user who sent the invite.
    pub inviter_id: UserId,
    /// The inviter's email, for display on the invitee's side.
    pub inviter_email: String,
    /// The email address the invite is addressed to.
    pub invitee_email: String,
    /// Current status.
    pub status: InviteStatus,
    /// When the invite was created.
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Create a pending invite.
    pub fn new(
        space_id: SpaceId,
        inviter_id: UserId,
        inviter_email: impl Into<String>,
        invitee_email: impl Into<String>,
    ) -> Self {
        Self {
            id: InviteId::new(),
            space_id,
            inviter_id,
            inviter_email: inviter_email.into(),
            invitee_email: invitee_email.into(),
            status: InviteStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Whether the invite is still awaiting an answer.
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    /// Whether the invite is addressed to the given email
    /// (case-insensitive, as email local parts are in practice).
    pub fn addressed_to(&self, email: &str) -> bool {
        self.invitee_email.eq_ignore_ascii_case(email)
    }
}
