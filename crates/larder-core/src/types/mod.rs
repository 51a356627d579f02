//! Shared type definitions: typed identifiers and sync status.

pub mod id;
pub mod sync;

pub use id::{InviteId, ItemId, RecipeId, SpaceId, UserId};
pub use sync::SyncStatus;
