//! Grocery/pantry item entities.

pub mod membership;
pub mod model;

pub use membership::{ListKind, ListMembership, PantryEntry, ShoppingEntry};
pub use model::{Item, DEFAULT_CATEGORY};
