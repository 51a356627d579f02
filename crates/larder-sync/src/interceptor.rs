//! Change interception: turning an applied command into remote pushes.
//!
//! [`plan`] is pure: given the command and the before/after states, it
//! computes the exact set of remote operations the command warrants,
//! driven entirely by the command's declared
//! [`SyncClass`](larder_store::SyncClass). Whether the plan runs at all
//! is the service's decision (provenance, sharing state, bound space).

use larder_core::types::{ItemId, RecipeId};
use larder_entity::{Item, Recipe};
use larder_store::{AppState, Command, ItemTarget, SyncClass};

/// One outbound remote operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOp {
    /// Write an item's full record.
    SetItem(Item),
    /// Delete an item document.
    DeleteItem(ItemId),
    /// Write a recipe's full record.
    SetRecipe(Recipe),
    /// Delete a recipe document.
    DeleteRecipe(RecipeId),
}

/// Compute the pushes an applied command warrants.
pub fn plan(command: &Command, before: &AppState, after: &AppState) -> Vec<PushOp> {
    match command.sync_class() {
        SyncClass::None => Vec::new(),

        SyncClass::ItemUpsert(target) => {
            let item = match &target {
                ItemTarget::Id(id) => after.items.get(id),
                // Id-less add: the reducer resolved the record, find it
                // the same way it did.
                ItemTarget::Name(name) => after.item_by_name(name),
            };
            item.map(|item| vec![PushOp::SetItem(item.clone())])
                .unwrap_or_default()
        }

        SyncClass::ItemDiff => {
            let mut ops = Vec::new();
            // Ids present before and absent after become deletes.
            for id in before.items.keys() {
                if !after.items.contains_key(id) {
                    ops.push(PushOp::DeleteItem(*id));
                }
            }
            // Ids present on both sides push an update when their
            // serialized content differs.
            for (id, item) in &after.items {
                let changed = before.items.get(id).is_some_and(|prev| {
                    serde_json::to_value(prev).ok() != serde_json::to_value(item).ok()
                });
                if changed {
                    ops.push(PushOp::SetItem(item.clone()));
                }
            }
            ops
        }

        SyncClass::RecipeUpsert(id) => after
            .recipes
            .get(&id)
            .map(|recipe| vec![PushOp::SetRecipe(recipe.clone())])
            .unwrap_or_default(),

        SyncClass::RecipeDelete(id) => vec![PushOp::DeleteRecipe(id)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_entity::ListKind;
    use larder_store::reducer;

    fn dispatch(state: &AppState, command: &Command) -> (AppState, Vec<PushOp>) {
        let mut after = state.clone();
        reducer::apply(&mut after, command);
        let ops = plan(command, state, &after);
        (after, ops)
    }

    fn add(state: &mut AppState, name: &str, list: ListKind) {
        reducer::apply(
            state,
            &Command::AddItem {
                name: name.into(),
                quantity: "1".into(),
                unit: None,
                category: None,
                list,
            },
        );
    }

    #[test]
    fn test_add_pushes_resolved_record() {
        let state = AppState::default();
        let (_, ops) = dispatch(
            &state,
            &Command::AddItem {
                name: "Milk".into(),
                quantity: "1".into(),
                unit: None,
                category: None,
                list: ListKind::Shopping,
            },
        );
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            PushOp::SetItem(item) => assert_eq!(item.name, "Milk"),
            other => panic!("expected SetItem, got {other:?}"),
        }
    }

    #[test]
    fn test_bulk_clear_deletes_exactly_the_removed_ids() {
        let mut state = AppState::default();
        add(&mut state, "Milk", ListKind::Shopping);
        add(&mut state, "Bread", ListKind::Shopping);
        add(&mut state, "Eggs", ListKind::Pantry);

        let (after, ops) = dispatch(
            &state,
            &Command::ClearList {
                list: ListKind::Shopping,
            },
        );
        assert!(after.item_by_name("Milk").is_none());

        let mut deleted: Vec<ItemId> = ops
            .iter()
            .filter_map(|op| match op {
                PushOp::DeleteItem(id) => Some(*id),
                _ => None,
            })
            .collect();
        deleted.sort();
        let mut expected: Vec<ItemId> = state
            .items
            .keys()
            .filter(|id| !after.items.contains_key(id))
            .copied()
            .collect();
        expected.sort();
        assert_eq!(deleted, expected);
        assert_eq!(deleted.len(), 2);
        // Eggs is still present and unchanged, so no update either.
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_remove_one_membership_pushes_update_not_delete() {
        let mut state = AppState::default();
        add(&mut state, "Milk", ListKind::Shopping);
        add(&mut state, "Milk", ListKind::Pantry);
        let id = state.item_by_name("Milk").unwrap().id;

        let (_, ops) = dispatch(
            &state,
            &Command::RemoveFromList {
                id,
                list: ListKind::Shopping,
            },
        );
        // The pantry membership keeps the item alive remotely; the
        // shrunken record is pushed as an update.
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            PushOp::SetItem(item) => assert!(item.membership.shopping.is_none()),
            other => panic!("expected SetItem, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_last_membership_pushes_delete() {
        let mut state = AppState::default();
        add(&mut state, "Milk", ListKind::Shopping);
        let id = state.item_by_name("Milk").unwrap().id;

        let (_, ops) = dispatch(
            &state,
            &Command::RemoveFromList {
                id,
                list: ListKind::Shopping,
            },
        );
        assert_eq!(ops, vec![PushOp::DeleteItem(id)]);
    }

    #[test]
    fn test_recipe_delete_pushes_by_id_without_lookup() {
        let state = AppState::default();
        let id = RecipeId::new();
        // The recipe does not even exist locally; the delete still goes
        // out keyed by the given id.
        let (_, ops) = dispatch(&state, &Command::RemoveRecipe { id });
        assert_eq!(ops, vec![PushOp::DeleteRecipe(id)]);
    }

    #[test]
    fn test_ingest_replace_plans_nothing() {
        let mut state = AppState::default();
        add(&mut state, "Milk", ListKind::Shopping);

        let (_, ops) = dispatch(&state, &Command::ReplaceItems { items: Vec::new() });
        assert!(ops.is_empty());
    }
}
