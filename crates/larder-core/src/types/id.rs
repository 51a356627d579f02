//! Newtype wrappers around [`uuid::Uuid`] for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `UserId` where an
//! `ItemId` is expected. A [`SpaceId`] can be built from a [`UserId`]
//! because a space is keyed by the id of the user who owns it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a signed-in user, issued by the identity provider.
    UserId
}

define_id! {
    /// Identifier of a shared space. Equal to the owning user's id.
    SpaceId
}

define_id! {
    /// Identifier of a grocery/pantry item. Never reused.
    ItemId
}

define_id! {
    /// Identifier of a recipe.
    RecipeId
}

define_id! {
    /// Identifier of an invite document.
    InviteId
}

impl From<UserId> for SpaceId {
    /// A user's own space shares the user's id.
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

impl SpaceId {
    /// The id of the user who owns this space.
    pub fn owner(&self) -> UserId {
        UserId(self.0)
    }
}
