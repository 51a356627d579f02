//! The remote space repository contract.

use std::sync::Arc;

use async_trait::async_trait;

use larder_core::types::{InviteId, ItemId, RecipeId, SpaceId, UserId};
use larder_core::AppResult;
use larder_entity::{Invite, InviteStatus, Item, Member, Recipe, Space};

use crate::subscription::SubscriptionHandle;

/// Snapshot delivery callback for subscriptions.
pub type SnapshotFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// CRUD + realtime subscriptions over the multi-tenant document store,
/// scoped by space id.
///
/// Contract obligations for every implementation:
///
/// * Writes recursively strip undefined-valued fields before persisting
///   (see [`crate::sanitize`]); the backing store rejects them.
/// * Subscription callbacks never receive a snapshot that reflects this
///   client's own not-yet-acknowledged write. Snapshots flagged as
///   containing unacknowledged local writes are dropped, not delivered;
///   the confirmed snapshot that follows is delivered normally.
#[async_trait]
pub trait SpaceRepository: Send + Sync + 'static {
    // ── Spaces ───────────────────────────────────────────────────────

    /// Fetch a space document.
    async fn get_space(&self, id: SpaceId) -> AppResult<Option<Space>>;

    /// Create or overwrite a space document.
    async fn create_space(&self, space: &Space) -> AppResult<()>;

    /// Watch one space document.
    async fn subscribe_space(
        &self,
        id: SpaceId,
        on_change: SnapshotFn<Option<Space>>,
    ) -> AppResult<SubscriptionHandle>;

    /// Spaces the user is a member of.
    async fn get_user_spaces(&self, user_id: UserId) -> AppResult<Vec<Space>>;

    /// Watch the set of spaces the user is a member of.
    async fn subscribe_user_spaces(
        &self,
        user_id: UserId,
        on_change: SnapshotFn<Vec<Space>>,
    ) -> AppResult<SubscriptionHandle>;

    /// Pause sharing on a space; members become read-only and are
    /// expected to switch back to their own spaces.
    async fn pause_sharing(&self, id: SpaceId) -> AppResult<()>;

    /// Resume sharing on a space.
    async fn resume_sharing(&self, id: SpaceId) -> AppResult<()>;

    // ── Items ────────────────────────────────────────────────────────

    /// Watch a space's item collection.
    async fn subscribe_items(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Item>>,
    ) -> AppResult<SubscriptionHandle>;

    /// Write one item document.
    async fn set_item(&self, space_id: SpaceId, item: &Item, actor_id: UserId) -> AppResult<()>;

    /// Delete one item document.
    async fn delete_item(&self, space_id: SpaceId, item_id: ItemId) -> AppResult<()>;

    /// Write a batch of item documents.
    async fn batch_set_items(
        &self,
        space_id: SpaceId,
        items: &[Item],
        actor_id: UserId,
    ) -> AppResult<()>;

    /// Drop every item document in the space.
    async fn clear_items(&self, space_id: SpaceId) -> AppResult<()>;

    // ── Recipes ──────────────────────────────────────────────────────

    /// Watch a space's recipe collection.
    async fn subscribe_recipes(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Recipe>>,
    ) -> AppResult<SubscriptionHandle>;

    /// Write one recipe document.
    async fn set_recipe(
        &self,
        space_id: SpaceId,
        recipe: &Recipe,
        actor_id: UserId,
    ) -> AppResult<()>;

    /// Delete one recipe document.
    async fn delete_recipe(&self, space_id: SpaceId, recipe_id: RecipeId) -> AppResult<()>;

    /// Write a batch of recipe documents.
    async fn batch_set_recipes(
        &self,
        space_id: SpaceId,
        recipes: &[Recipe],
        actor_id: UserId,
    ) -> AppResult<()>;

    /// Drop every recipe document in the space.
    async fn clear_recipes(&self, space_id: SpaceId) -> AppResult<()>;

    // ── Members ──────────────────────────────────────────────────────

    /// Watch a space's member sub-collection.
    async fn subscribe_members(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Member>>,
    ) -> AppResult<SubscriptionHandle>;

    /// Add a member: writes the member document and adds the id to the
    /// space's member set.
    async fn add_member(&self, member: &Member) -> AppResult<()>;

    /// Remove a member document and its id from the space's member set.
    async fn remove_member(&self, space_id: SpaceId, user_id: UserId) -> AppResult<()>;

    // ── Invites ──────────────────────────────────────────────────────

    /// Create an invite document.
    async fn create_invite(&self, invite: &Invite) -> AppResult<()>;

    /// Fetch an invite by id.
    async fn get_invite(&self, id: InviteId) -> AppResult<Option<Invite>>;

    /// The pending invite for this (space, invitee email) pair, if any.
    async fn find_pending_invite(
        &self,
        space_id: SpaceId,
        invitee_email: &str,
    ) -> AppResult<Option<Invite>>;

    /// All pending invites addressed to an email.
    async fn pending_invites_for_email(&self, email: &str) -> AppResult<Vec<Invite>>;

    /// All invites sent from a space (owner-side listing).
    async fn invites_for_space(&self, space_id: SpaceId) -> AppResult<Vec<Invite>>;

    /// Update an invite's status.
    async fn update_invite_status(&self, id: InviteId, status: InviteStatus) -> AppResult<()>;

    /// Delete an invite document outright (owner-side cancel).
    async fn delete_invite(&self, id: InviteId) -> AppResult<()>;
}
