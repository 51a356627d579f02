//! Store commands and their synchronization capability metadata.
//!
//! Every mutation of the local store is one of these variants, dispatched
//! with an explicit [`Origin`]. Each variant declares how it synchronizes
//! through [`Command::sync_class`]; the change interceptor consumes only
//! that declaration, so adding a variant forces a decision about its sync
//! behavior at definition time.

use serde::{Deserialize, Serialize};

use larder_core::types::{ItemId, RecipeId, SpaceId, SyncStatus};
use larder_entity::{Item, ListKind, Recipe, Space};

/// Who initiated a command.
///
/// Read synchronously by the change interceptor: only `Local` commands
/// are candidates for outbound pushes. Remote snapshot ingests and
/// subscription-driven bookkeeping are dispatched as `Remote` and can
/// never echo back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A user-initiated mutation on this device.
    Local,
    /// An authoritative inbound change from the remote space.
    Remote,
}

/// How a command variant participates in synchronization.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncClass {
    /// The command never produces a push (settings, ingest replaces).
    None,
    /// A single item changed; push its full record.
    ItemUpsert(ItemTarget),
    /// The command can touch or delete many items; diff the before/after
    /// collections to find deletes and updates.
    ItemDiff,
    /// A single recipe changed; push its full record.
    RecipeUpsert(RecipeId),
    /// A recipe was deleted; push a remote delete for this id.
    RecipeDelete(RecipeId),
}

/// How to resolve the item affected by a single-item command.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemTarget {
    /// The command payload names the item directly.
    Id(ItemId),
    /// Id-less add: resolve by case-insensitive name in the after-state.
    Name(String),
}

/// Every mutation the local store accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    // ── Items ────────────────────────────────────────────────────────
    /// Add an item to a list. Merges into an existing item of the same
    /// name (case-insensitive) instead of creating a duplicate.
    AddItem {
        /// Item name as entered.
        name: String,
        /// Quantity as entered.
        quantity: String,
        /// Unit of measure, if any.
        unit: Option<String>,
        /// Category, if already resolved; defaults to `"other"`.
        category: Option<String>,
        /// Which list to add to.
        list: ListKind,
    },
    /// Replace an item's full record by id.
    UpdateItem {
        /// The new record; `item.id` selects the target.
        item: Item,
    },
    /// Remove an item from one list, deleting it if that was its last
    /// membership.
    RemoveFromList {
        /// The item to remove.
        id: ItemId,
        /// The list to remove it from.
        list: ListKind,
    },
    /// Toggle the completed flag of a shopping-list entry.
    ToggleCompleted {
        /// The item to toggle.
        id: ItemId,
    },
    /// Remove every completed entry from the shopping list.
    ClearCompleted,
    /// Remove every expired entry from the pantry.
    ClearExpired,
    /// Remove every entry from one list.
    ClearList {
        /// The list to clear.
        list: ListKind,
    },
    /// Replace the whole item collection with a remote snapshot.
    ReplaceItems {
        /// The authoritative item set.
        items: Vec<Item>,
    },

    // ── Recipes ──────────────────────────────────────────────────────
    /// Add a recipe.
    AddRecipe {
        /// The recipe to add; carries its own id.
        recipe: Recipe,
    },
    /// Replace a recipe's full record by id.
    UpdateRecipe {
        /// The new record; `recipe.id` selects the target.
        recipe: Recipe,
    },
    /// Delete a recipe.
    RemoveRecipe {
        /// The recipe to delete.
        id: RecipeId,
    },
    /// Replace the whole recipe collection with a remote snapshot.
    ReplaceRecipes {
        /// The authoritative recipe set.
        recipes: Vec<Recipe>,
    },

    // ── Settings ─────────────────────────────────────────────────────
    /// Enable or disable sharing. Disabling cascades: the bound space is
    /// cleared and the status returns to local.
    SetSharingEnabled {
        /// New value.
        enabled: bool,
    },
    /// Bind or unbind the current space.
    SetCurrentSpace {
        /// The space to bind, or `None` for local-only.
        space_id: Option<SpaceId>,
    },
    /// Update the sync status.
    SetSyncStatus {
        /// New status.
        status: SyncStatus,
    },
    /// Refresh the cached list of spaces the user belongs to.
    SetAvailableSpaces {
        /// The new cache contents.
        spaces: Vec<Space>,
    },
    /// Reset all sync settings to local-only (sign-out path).
    ResetSettings,
}

impl Command {
    /// The synchronization capability of this variant.
    pub fn sync_class(&self) -> SyncClass {
        match self {
            Self::AddItem { name, .. } => SyncClass::ItemUpsert(ItemTarget::Name(name.clone())),
            Self::UpdateItem { item } => SyncClass::ItemUpsert(ItemTarget::Id(item.id)),
            Self::ToggleCompleted { id } => SyncClass::ItemUpsert(ItemTarget::Id(*id)),
            Self::RemoveFromList { .. }
            | Self::ClearCompleted
            | Self::ClearExpired
            | Self::ClearList { .. } => SyncClass::ItemDiff,
            Self::AddRecipe { recipe } | Self::UpdateRecipe { recipe } => {
                SyncClass::RecipeUpsert(recipe.id)
            }
            Self::RemoveRecipe { id } => SyncClass::RecipeDelete(*id),
            Self::ReplaceItems { .. }
            | Self::ReplaceRecipes { .. }
            | Self::SetSharingEnabled { .. }
            | Self::SetCurrentSpace { .. }
            | Self::SetSyncStatus { .. }
            | Self::SetAvailableSpaces { .. }
            | Self::ResetSettings => SyncClass::None,
        }
    }
}
