//! The in-memory state held by the local store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use larder_core::types::{ItemId, RecipeId};
use larder_entity::{Item, ListKind, Recipe, SyncSettings};

/// Everything the local store holds: settings, items, recipes.
///
/// Collections are keyed by id; list ordering lives in the per-membership
/// `order` fields, not in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Sharing/space state of this device.
    #[serde(default)]
    pub settings: SyncSettings,
    /// All items, across both lists.
    #[serde(default)]
    pub items: HashMap<ItemId, Item>,
    /// All recipes.
    #[serde(default)]
    pub recipes: HashMap<RecipeId, Recipe>,
}

impl AppState {
    /// Case-insensitive item lookup by name. Used to resolve id-less add
    /// commands and to merge duplicate adds into one item.
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.values().find(|item| item.matches_name(name))
    }

    /// Next sort position for a new entry on the given list.
    pub fn next_order(&self, list: ListKind) -> i32 {
        self.items
            .values()
            .filter_map(|item| match list {
                ListKind::Pantry => item.membership.pantry.as_ref().map(|e| e.order),
                ListKind::Shopping => item.membership.shopping.as_ref().map(|e| e.order),
            })
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Items on the given list, unsorted.
    pub fn items_on(&self, list: ListKind) -> impl Iterator<Item = &Item> {
        self.items
            .values()
            .filter(move |item| item.membership.contains(list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_by_name_ignores_case() {
        let mut state = AppState::default();
        let item = Item::new("Milk", "1", None, None, ListKind::Pantry, 0);
        let id = item.id;
        state.items.insert(id, item);

        assert_eq!(state.item_by_name("mIlK").map(|i| i.id), Some(id));
        assert!(state.item_by_name("Bread").is_none());
    }

    #[test]
    fn test_next_order_is_per_list() {
        let mut state = AppState::default();
        let item = Item::new("Milk", "1", None, None, ListKind::Pantry, 4);
        state.items.insert(item.id, item);

        assert_eq!(state.next_order(ListKind::Pantry), 5);
        assert_eq!(state.next_order(ListKind::Shopping), 0);
    }
}
