//! # larder
//!
//! Facade over the Larder sync engine: an offline-first grocery, pantry,
//! and recipe store that stays consistent with a shared remote space
//! edited by multiple devices and users.
//!
//! The [`bootstrap`] module is the composition root: it loads the
//! persisted snapshot (running schema migrations, quarantining an
//! unreadable blob), wires the store, repository, and identity provider
//! into a [`SyncService`], and keeps the snapshot saved as state
//! changes.

pub mod bootstrap;

pub use bootstrap::{bootstrap, init_logging, App};

pub use larder_auth::{AuthUser, IdentityProvider, MemoryIdentity};
pub use larder_core::config::AppConfig;
pub use larder_core::error::{AppError, ErrorKind};
pub use larder_core::events::{EventPayload, SpaceEvent, SyncEvent, SyncStateEvent};
pub use larder_core::types::{InviteId, ItemId, RecipeId, SpaceId, SyncStatus, UserId};
pub use larder_core::AppResult;
pub use larder_entity::{
    Ingredient, Invite, InviteStatus, Item, ListKind, ListMembership, Member, MemberRole,
    PantryEntry, Recipe, ShoppingEntry, Space, SyncSettings,
};
pub use larder_remote::{MemorySpaceBackend, MemorySpaceRepository, SpaceRepository};
pub use larder_store::{AppState, Command, Origin, SnapshotStore, Store};
pub use larder_sync::SyncService;
