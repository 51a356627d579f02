//! Space membership records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::error::AppError;
use larder_core::types::{SpaceId, UserId};

/// Role of a member within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// The user who created the space.
    Owner,
    /// A member who can edit items and recipes.
    Editor,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Editor => write!(f, "editor"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            other => Err(AppError::validation(format!("Unknown member role: {other}"))),
        }
    }
}

/// A (space, user) membership record stored in the space's member
/// sub-collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// The space this membership belongs to.
    pub space_id: SpaceId,
    /// The member's user id.
    pub user_id: UserId,
    /// The member's role.
    pub role: MemberRole,
    /// The member's email.
    pub email: String,
    /// The member's display name, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// When the member joined the space.
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Create a membership record joining now.
    pub fn new(
        space_id: SpaceId,
        user_id: UserId,
        role: MemberRole,
        email: impl Into<String>,
    ) -> Self {
        Self {
            space_id,
            user_id,
            role,
            email: email.into(),
            display_name: None,
            joined_at: Utc::now(),
        }
    }
}
