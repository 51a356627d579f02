//! Per-list membership metadata for items.
//!
//! An item exists on the pantry list, the shopping list, or both. Each
//! membership carries list-specific metadata and an independent sort
//! order. An item whose last membership is removed must be deleted from
//! the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two lists an item can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// The pantry inventory list.
    Pantry,
    /// The shopping list.
    Shopping,
}

/// Pantry-side membership metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryEntry {
    /// When the item expires, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the item was added to the pantry.
    pub added_at: DateTime<Utc>,
    /// Sort position within the pantry list.
    pub order: i32,
}

impl PantryEntry {
    /// Create a fresh pantry membership at the given sort position.
    pub fn new(order: i32) -> Self {
        Self {
            expires_at: None,
            added_at: Utc::now(),
            order,
        }
    }

    /// Whether the entry has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Shopping-side membership metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingEntry {
    /// Whether the item has been checked off.
    pub completed: bool,
    /// When the item was added to the shopping list.
    pub created_at: DateTime<Utc>,
    /// Sort position within the shopping list.
    pub order: i32,
}

impl ShoppingEntry {
    /// Create a fresh shopping membership at the given sort position.
    pub fn new(order: i32) -> Self {
        Self {
            completed: false,
            created_at: Utc::now(),
            order,
        }
    }
}

/// An item's presence on the pantry and/or shopping lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMembership {
    /// Pantry membership, if the item is in the pantry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pantry: Option<PantryEntry>,
    /// Shopping membership, if the item is on the shopping list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping: Option<ShoppingEntry>,
}

impl ListMembership {
    /// Whether the item belongs to no list at all.
    ///
    /// Such an item violates the no-orphan rule and must be removed.
    pub fn is_empty(&self) -> bool {
        self.pantry.is_none() && self.shopping.is_none()
    }

    /// Whether the item belongs to the given list.
    pub fn contains(&self, list: ListKind) -> bool {
        match list {
            ListKind::Pantry => self.pantry.is_some(),
            ListKind::Shopping => self.shopping.is_some(),
        }
    }

    /// Remove the membership for the given list.
    pub fn remove(&mut self, list: ListKind) {
        match list {
            ListKind::Pantry => self.pantry = None,
            ListKind::Shopping => self.shopping = None,
        }
    }
}
