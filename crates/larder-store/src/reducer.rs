//! The pure reducer: one synchronous state transition per command.
//!
//! The reducer is infallible; commands that reference missing entities
//! are no-ops. It is the only code that writes `AppState`, and it is
//! where the no-orphan rule is enforced: an item stripped of its last
//! list membership is removed in the same transition.

use chrono::Utc;

use larder_entity::item::model::resolve_category;
use larder_entity::{Item, ListKind, PantryEntry, ShoppingEntry};

use crate::command::Command;
use crate::state::AppState;

/// Apply a command to the state, in place.
pub fn apply(state: &mut AppState, command: &Command) {
    match command {
        Command::AddItem {
            name,
            quantity,
            unit,
            category,
            list,
        } => add_item(state, name, quantity, unit.clone(), category.clone(), *list),
        Command::UpdateItem { item } => {
            if item.is_orphaned() {
                state.items.remove(&item.id);
            } else if state.items.contains_key(&item.id) {
                let mut item = item.clone();
                item.category = resolve_category(Some(item.category));
                state.items.insert(item.id, item);
            }
        }
        Command::RemoveFromList { id, list } => {
            if let Some(item) = state.items.get_mut(id) {
                item.membership.remove(*list);
                if item.is_orphaned() {
                    state.items.remove(id);
                }
            }
        }
        Command::ToggleCompleted { id } => {
            if let Some(entry) = state
                .items
                .get_mut(id)
                .and_then(|item| item.membership.shopping.as_mut())
            {
                entry.completed = !entry.completed;
            }
        }
        Command::ClearCompleted => {
            for item in state.items.values_mut() {
                if item
                    .membership
                    .shopping
                    .as_ref()
                    .is_some_and(|e| e.completed)
                {
                    item.membership.shopping = None;
                }
            }
            state.items.retain(|_, item| !item.is_orphaned());
        }
        Command::ClearExpired => {
            let now = Utc::now();
            for item in state.items.values_mut() {
                if item
                    .membership
                    .pantry
                    .as_ref()
                    .is_some_and(|e| e.is_expired(now))
                {
                    item.membership.pantry = None;
                }
            }
            state.items.retain(|_, item| !item.is_orphaned());
        }
        Command::ClearList { list } => {
            for item in state.items.values_mut() {
                item.membership.remove(*list);
            }
            state.items.retain(|_, item| !item.is_orphaned());
        }
        Command::ReplaceItems { items } => {
            state.items = items.iter().cloned().map(|i| (i.id, i)).collect();
        }

        Command::AddRecipe { recipe } | Command::UpdateRecipe { recipe } => {
            state.recipes.insert(recipe.id, recipe.clone());
        }
        Command::RemoveRecipe { id } => {
            state.recipes.remove(id);
        }
        Command::ReplaceRecipes { recipes } => {
            state.recipes = recipes.iter().cloned().map(|r| (r.id, r)).collect();
        }

        Command::SetSharingEnabled { enabled } => {
            if *enabled {
                state.settings.sharing_enabled = true;
            } else {
                state.settings.disable_sharing();
            }
        }
        Command::SetCurrentSpace { space_id } => {
            state.settings.current_space_id = *space_id;
        }
        Command::SetSyncStatus { status } => {
            state.settings.sync_status = *status;
        }
        Command::SetAvailableSpaces { spaces } => {
            state.settings.available_spaces = spaces.clone();
        }
        Command::ResetSettings => {
            state.settings.reset_to_local();
        }
    }
}

fn add_item(
    state: &mut AppState,
    name: &str,
    quantity: &str,
    unit: Option<String>,
    category: Option<String>,
    list: ListKind,
) {
    let order = state.next_order(list);

    let existing = state.item_by_name(name).map(|item| item.id);
    if let Some(item) = existing.and_then(|id| state.items.get_mut(&id)) {
        item.quantity = quantity.to_string();
        if unit.is_some() {
            item.unit = unit;
        }
        if let Some(category) = category {
            item.category = resolve_category(Some(category));
        }
        match list {
            ListKind::Pantry => {
                if item.membership.pantry.is_none() {
                    item.membership.pantry = Some(PantryEntry::new(order));
                }
            }
            ListKind::Shopping => {
                if item.membership.shopping.is_none() {
                    item.membership.shopping = Some(ShoppingEntry::new(order));
                }
            }
        }
        return;
    }

    let item = Item::new(name, quantity, unit, category, list, order);
    state.items.insert(item.id, item);
}
