//! Item entity model.

use serde::{Deserialize, Serialize};

use larder_core::types::ItemId;

use super::membership::{ListKind, ListMembership, PantryEntry, ShoppingEntry};

/// Fallback category for items the categorizer cannot place.
pub const DEFAULT_CATEGORY: &str = "other";

/// A grocery/pantry entity, unique by id across both lists.
///
/// Items are created when first added to either list and destroyed when
/// the last list membership is removed. Ids are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier.
    pub id: ItemId,
    /// Display name, free text.
    pub name: String,
    /// Quantity as entered by the user, e.g. `"2"` or `"1.5"`.
    pub quantity: String,
    /// Unit of measure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Resolved category. Never absent; defaults to [`DEFAULT_CATEGORY`].
    #[serde(default = "default_category")]
    pub category: String,
    /// Which lists the item is on.
    #[serde(default)]
    pub membership: ListMembership,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Item {
    /// Create a new item on the given list.
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: Option<String>,
        category: Option<String>,
        list: ListKind,
        order: i32,
    ) -> Self {
        let mut membership = ListMembership::default();
        match list {
            ListKind::Pantry => membership.pantry = Some(PantryEntry::new(order)),
            ListKind::Shopping => membership.shopping = Some(ShoppingEntry::new(order)),
        }
        Self {
            id: ItemId::new(),
            name: name.into(),
            quantity: quantity.into(),
            unit,
            category: resolve_category(category),
            membership,
        }
    }

    /// Whether the item has no list membership left and must be removed.
    pub fn is_orphaned(&self) -> bool {
        self.membership.is_empty()
    }

    /// Case-insensitive name comparison used for add-merging and the
    /// legacy snapshot migration.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Resolve an optional category to a concrete one.
pub fn resolve_category(category: Option<String>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => default_category(),
    }
}
