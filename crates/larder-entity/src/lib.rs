//! # larder-entity
//!
//! Domain entities for the Larder sync engine: items with per-list
//! memberships, recipes, shared spaces, members, invites, and the local
//! sync settings blob.

pub mod item;
pub mod recipe;
pub mod settings;
pub mod space;

pub use item::{Item, ListKind, ListMembership, PantryEntry, ShoppingEntry};
pub use recipe::{Ingredient, Recipe};
pub use settings::SyncSettings;
pub use space::{Invite, InviteStatus, Member, MemberRole, Space};
