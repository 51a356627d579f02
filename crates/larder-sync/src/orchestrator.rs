//! Subscription lifecycle over `(user, space)`.
//!
//! Three states, monotonic per binding:
//!
//! * **Detached** — no user, no subscriptions.
//! * **User-bound** — subscribed to the user's space list only.
//! * **Space-bound** — additionally subscribed to one space's items and
//!   recipes.
//!
//! Handles are dropped to unsubscribe; in-flight pushes are deliberately
//! not cancelled and land on whichever space was bound at call time.

use larder_core::types::{SpaceId, UserId};
use larder_core::AppResult;
use larder_entity::{Item, Recipe, Space};
use larder_remote::{SnapshotFn, SpaceRepository, SubscriptionHandle};
use tracing::debug;

/// Holds the live subscriptions of one sync engine.
#[derive(Default)]
pub struct Orchestrator {
    user_id: Option<UserId>,
    space_id: Option<SpaceId>,
    spaces_sub: Option<SubscriptionHandle>,
    items_sub: Option<SubscriptionHandle>,
    recipes_sub: Option<SubscriptionHandle>,
}

impl Orchestrator {
    /// A detached orchestrator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// The bound space, if any.
    pub fn space_id(&self) -> Option<SpaceId> {
        self.space_id
    }

    /// Bind a user (or unbind with `None`).
    ///
    /// Idempotent: rebinding the same user keeps the existing
    /// subscriptions. A change tears everything down first, then
    /// subscribes to the new user's space list. Returns whether the
    /// binding changed.
    pub async fn set_user(
        &mut self,
        repo: &dyn SpaceRepository,
        user_id: Option<UserId>,
        on_spaces: SnapshotFn<Vec<Space>>,
    ) -> AppResult<bool> {
        if self.user_id == user_id {
            return Ok(false);
        }

        self.detach();
        self.user_id = user_id;
        if let Some(id) = user_id {
            debug!(user_id = %id, "subscribing to user space list");
            self.spaces_sub = Some(repo.subscribe_user_spaces(id, on_spaces).await?);
        }
        Ok(true)
    }

    /// Bind a space: tears down only the collection subscriptions (the
    /// space-list subscription persists), then subscribes to the new
    /// space's items and recipes.
    pub async fn bind_space(
        &mut self,
        repo: &dyn SpaceRepository,
        space_id: SpaceId,
        on_items: SnapshotFn<Vec<Item>>,
        on_recipes: SnapshotFn<Vec<Recipe>>,
    ) -> AppResult<()> {
        self.items_sub = None;
        self.recipes_sub = None;
        self.space_id = Some(space_id);

        debug!(space_id = %space_id, "subscribing to space collections");
        self.items_sub = Some(repo.subscribe_items(space_id, on_items).await?);
        self.recipes_sub = Some(repo.subscribe_recipes(space_id, on_recipes).await?);
        Ok(())
    }

    /// Tear down every subscription and clear both bindings.
    pub fn detach(&mut self) {
        self.spaces_sub = None;
        self.items_sub = None;
        self.recipes_sub = None;
        self.space_id = None;
        self.user_id = None;
    }
}
