//! In-process space backend.
//!
//! A multi-client document store with the same observable behavior as
//! the hosted one: per-space document collections, realtime snapshot
//! delivery over broadcast channels, and suppression of the local echo
//! of a client's own unacknowledged writes. Every client handle created
//! by [`MemorySpaceBackend::client`] shares the same underlying store,
//! so tests and the composition root can run several devices against
//! one backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use larder_core::error::AppError;
use larder_core::types::{InviteId, ItemId, RecipeId, SpaceId, UserId};
use larder_core::AppResult;
use larder_entity::{Invite, InviteStatus, Item, Member, Recipe, Space};

use crate::repository::{SnapshotFn, SpaceRepository};
use crate::sanitize;
use crate::subscription::SubscriptionHandle;

/// Which collection a change notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Space(SpaceId),
    Items(SpaceId),
    Recipes(SpaceId),
    Members(SpaceId),
}

/// One change propagated to subscribers.
///
/// Every write emits two notices: first the writer's local echo with
/// `pending` set (dropped by everyone — by the writer per the
/// pending-writes contract, by other clients because foreign pending
/// state is invisible), then the acknowledged notice delivered to all.
#[derive(Debug, Clone, Copy)]
struct ChangeNotice {
    scope: Scope,
    writer: Uuid,
    pending: bool,
}

/// Documents of one space.
#[derive(Debug, Default)]
struct SpaceDocs {
    space: Option<Value>,
    items: HashMap<ItemId, Value>,
    recipes: HashMap<RecipeId, Value>,
    members: HashMap<UserId, Value>,
}

/// Write counters, exposed for diagnostics and assertions.
#[derive(Debug, Default)]
pub struct WriteStats {
    item_writes: AtomicUsize,
    item_deletes: AtomicUsize,
    recipe_writes: AtomicUsize,
    recipe_deletes: AtomicUsize,
}

impl WriteStats {
    /// Item documents written (single and batched).
    pub fn item_writes(&self) -> usize {
        self.item_writes.load(Ordering::Relaxed)
    }

    /// Item documents deleted.
    pub fn item_deletes(&self) -> usize {
        self.item_deletes.load(Ordering::Relaxed)
    }

    /// Recipe documents written (single and batched).
    pub fn recipe_writes(&self) -> usize {
        self.recipe_writes.load(Ordering::Relaxed)
    }

    /// Recipe documents deleted.
    pub fn recipe_deletes(&self) -> usize {
        self.recipe_deletes.load(Ordering::Relaxed)
    }
}

/// The shared in-process store.
#[derive(Debug)]
pub struct MemorySpaceBackend {
    spaces: DashMap<SpaceId, SpaceDocs>,
    invites: DashMap<InviteId, Value>,
    changes: broadcast::Sender<ChangeNotice>,
    /// Write counters.
    pub stats: WriteStats,
}

impl MemorySpaceBackend {
    /// Create a backend whose change channel holds `capacity` notices.
    pub fn new(capacity: usize) -> Arc<Self> {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            spaces: DashMap::new(),
            invites: DashMap::new(),
            changes,
            stats: WriteStats::default(),
        })
    }

    /// Create a client handle bound to this backend.
    pub fn client(self: &Arc<Self>) -> MemorySpaceRepository {
        MemorySpaceRepository {
            backend: Arc::clone(self),
            client_id: Uuid::new_v4(),
        }
    }

    /// Drop a space and everything under it, as a backend-side admin
    /// action would. Subscribers see the space disappear.
    pub fn drop_space(&self, id: SpaceId) {
        self.spaces.remove(&id);
        let _ = self.changes.send(ChangeNotice {
            scope: Scope::Space(id),
            writer: Uuid::nil(),
            pending: false,
        });
    }

    fn notify(&self, scope: Scope, writer: Uuid) {
        let _ = self.changes.send(ChangeNotice {
            scope,
            writer,
            pending: true,
        });
        let _ = self.changes.send(ChangeNotice {
            scope,
            writer,
            pending: false,
        });
    }

    fn decode_space(&self, id: SpaceId) -> Option<Space> {
        self.spaces
            .get(&id)
            .and_then(|docs| docs.space.clone())
            .and_then(|doc| decode("space", &doc))
    }

    fn user_spaces(&self, user_id: UserId) -> Vec<Space> {
        let mut spaces: Vec<Space> = self
            .spaces
            .iter()
            .filter_map(|entry| entry.space.clone())
            .filter_map(|doc| decode::<Space>("space", &doc))
            .filter(|space| space.is_member(user_id))
            .collect();
        spaces.sort_by_key(|s| s.id);
        spaces
    }

    fn with_space_doc(
        &self,
        id: SpaceId,
        mutate: impl FnOnce(&mut Space),
    ) -> AppResult<()> {
        let mut docs = self
            .spaces
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Space {id} does not exist")))?;
        let mut space: Space = docs
            .space
            .as_ref()
            .and_then(|doc| decode("space", doc))
            .ok_or_else(|| AppError::not_found(format!("Space {id} does not exist")))?;
        mutate(&mut space);
        docs.space = Some(sanitize::to_document(&space)?);
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, doc: &Value) -> Option<T> {
    match serde_json::from_value(doc.clone()) {
        Ok(entity) => Some(entity),
        Err(e) => {
            warn!(kind, error = %e, "skipping undecodable remote document");
            None
        }
    }
}

fn decode_all<K, T: serde::de::DeserializeOwned>(
    kind: &str,
    docs: &HashMap<K, Value>,
) -> Vec<T> {
    docs.values().filter_map(|doc| decode(kind, doc)).collect()
}

/// One client's handle onto the shared backend.
///
/// Each handle has its own client identity; the identity is what the
/// pending-write suppression keys on.
#[derive(Debug, Clone)]
pub struct MemorySpaceRepository {
    backend: Arc<MemorySpaceBackend>,
    client_id: Uuid,
}

impl MemorySpaceRepository {
    /// The backing store shared with sibling clients.
    pub fn backend(&self) -> &Arc<MemorySpaceBackend> {
        &self.backend
    }

    /// Spawn a forwarder task delivering snapshots for matching scopes.
    ///
    /// `deliver` reads the current state and invokes the subscriber
    /// callback; `initial` controls whether the current snapshot is
    /// delivered immediately on subscribe.
    fn spawn_forwarder(
        &self,
        interest: impl Fn(Scope) -> bool + Send + 'static,
        deliver: impl Fn(&MemorySpaceBackend) + Send + Sync + 'static,
        initial: bool,
    ) -> SubscriptionHandle {
        let backend = Arc::clone(&self.backend);
        let client_id = self.client_id;
        let mut rx = self.backend.changes.subscribe();

        let task = tokio::spawn(async move {
            if initial {
                deliver(&backend);
            }
            loop {
                match rx.recv().await {
                    Ok(notice) => {
                        if !interest(notice.scope) {
                            continue;
                        }
                        if notice.pending {
                            if notice.writer == client_id {
                                debug!("suppressing snapshot containing own pending write");
                            }
                            continue;
                        }
                        deliver(&backend);
                    }
                    // Missed notices: resync from current state.
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "subscription lagged, resyncing");
                        deliver(&backend);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        SubscriptionHandle::new(task)
    }
}

#[async_trait]
impl SpaceRepository for MemorySpaceRepository {
    // ── Spaces ───────────────────────────────────────────────────────

    async fn get_space(&self, id: SpaceId) -> AppResult<Option<Space>> {
        Ok(self.backend.decode_space(id))
    }

    async fn create_space(&self, space: &Space) -> AppResult<()> {
        let doc = sanitize::to_document(space)?;
        self.backend.spaces.entry(space.id).or_default().space = Some(doc);
        self.backend.notify(Scope::Space(space.id), self.client_id);
        Ok(())
    }

    async fn subscribe_space(
        &self,
        id: SpaceId,
        on_change: SnapshotFn<Option<Space>>,
    ) -> AppResult<SubscriptionHandle> {
        Ok(self.spawn_forwarder(
            move |scope| scope == Scope::Space(id),
            move |backend| on_change(backend.decode_space(id)),
            true,
        ))
    }

    async fn get_user_spaces(&self, user_id: UserId) -> AppResult<Vec<Space>> {
        Ok(self.backend.user_spaces(user_id))
    }

    async fn subscribe_user_spaces(
        &self,
        user_id: UserId,
        on_change: SnapshotFn<Vec<Space>>,
    ) -> AppResult<SubscriptionHandle> {
        Ok(self.spawn_forwarder(
            |scope| matches!(scope, Scope::Space(_)),
            move |backend| on_change(backend.user_spaces(user_id)),
            true,
        ))
    }

    async fn pause_sharing(&self, id: SpaceId) -> AppResult<()> {
        self.backend
            .with_space_doc(id, |space| space.sharing_paused = true)?;
        self.backend.notify(Scope::Space(id), self.client_id);
        Ok(())
    }

    async fn resume_sharing(&self, id: SpaceId) -> AppResult<()> {
        self.backend
            .with_space_doc(id, |space| space.sharing_paused = false)?;
        self.backend.notify(Scope::Space(id), self.client_id);
        Ok(())
    }

    // ── Items ────────────────────────────────────────────────────────

    async fn subscribe_items(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Item>>,
    ) -> AppResult<SubscriptionHandle> {
        Ok(self.spawn_forwarder(
            move |scope| scope == Scope::Items(space_id),
            move |backend| {
                let snapshot = backend
                    .spaces
                    .get(&space_id)
                    .map(|docs| decode_all("item", &docs.items));
                if let Some(items) = snapshot {
                    on_change(items);
                }
            },
            true,
        ))
    }

    async fn set_item(&self, space_id: SpaceId, item: &Item, actor_id: UserId) -> AppResult<()> {
        let mut doc = sanitize::to_document(item)?;
        doc["updated_by"] = serde_json::to_value(actor_id)?;
        self.backend
            .spaces
            .entry(space_id)
            .or_default()
            .items
            .insert(item.id, doc);
        self.backend.stats.item_writes.fetch_add(1, Ordering::Relaxed);
        self.backend.notify(Scope::Items(space_id), self.client_id);
        Ok(())
    }

    async fn delete_item(&self, space_id: SpaceId, item_id: ItemId) -> AppResult<()> {
        if let Some(mut docs) = self.backend.spaces.get_mut(&space_id) {
            docs.items.remove(&item_id);
        }
        self.backend.stats.item_deletes.fetch_add(1, Ordering::Relaxed);
        self.backend.notify(Scope::Items(space_id), self.client_id);
        Ok(())
    }

    async fn batch_set_items(
        &self,
        space_id: SpaceId,
        items: &[Item],
        actor_id: UserId,
    ) -> AppResult<()> {
        {
            let mut docs = self.backend.spaces.entry(space_id).or_default();
            for item in items {
                let mut doc = sanitize::to_document(item)?;
                doc["updated_by"] = serde_json::to_value(actor_id)?;
                docs.items.insert(item.id, doc);
            }
        }
        self.backend
            .stats
            .item_writes
            .fetch_add(items.len(), Ordering::Relaxed);
        self.backend.notify(Scope::Items(space_id), self.client_id);
        Ok(())
    }

    async fn clear_items(&self, space_id: SpaceId) -> AppResult<()> {
        if let Some(mut docs) = self.backend.spaces.get_mut(&space_id) {
            docs.items.clear();
        }
        self.backend.notify(Scope::Items(space_id), self.client_id);
        Ok(())
    }

    // ── Recipes ──────────────────────────────────────────────────────

    async fn subscribe_recipes(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Recipe>>,
    ) -> AppResult<SubscriptionHandle> {
        Ok(self.spawn_forwarder(
            move |scope| scope == Scope::Recipes(space_id),
            move |backend| {
                let snapshot = backend
                    .spaces
                    .get(&space_id)
                    .map(|docs| decode_all("recipe", &docs.recipes));
                if let Some(recipes) = snapshot {
                    on_change(recipes);
                }
            },
            true,
        ))
    }

    async fn set_recipe(
        &self,
        space_id: SpaceId,
        recipe: &Recipe,
        actor_id: UserId,
    ) -> AppResult<()> {
        let mut doc = sanitize::to_document(recipe)?;
        doc["updated_by"] = serde_json::to_value(actor_id)?;
        self.backend
            .spaces
            .entry(space_id)
            .or_default()
            .recipes
            .insert(recipe.id, doc);
        self.backend
            .stats
            .recipe_writes
            .fetch_add(1, Ordering::Relaxed);
        self.backend.notify(Scope::Recipes(space_id), self.client_id);
        Ok(())
    }

    async fn delete_recipe(&self, space_id: SpaceId, recipe_id: RecipeId) -> AppResult<()> {
        if let Some(mut docs) = self.backend.spaces.get_mut(&space_id) {
            docs.recipes.remove(&recipe_id);
        }
        self.backend
            .stats
            .recipe_deletes
            .fetch_add(1, Ordering::Relaxed);
        self.backend.notify(Scope::Recipes(space_id), self.client_id);
        Ok(())
    }

    async fn batch_set_recipes(
        &self,
        space_id: SpaceId,
        recipes: &[Recipe],
        actor_id: UserId,
    ) -> AppResult<()> {
        {
            let mut docs = self.backend.spaces.entry(space_id).or_default();
            for recipe in recipes {
                let mut doc = sanitize::to_document(recipe)?;
                doc["updated_by"] = serde_json::to_value(actor_id)?;
                docs.recipes.insert(recipe.id, doc);
            }
        }
        self.backend
            .stats
            .recipe_writes
            .fetch_add(recipes.len(), Ordering::Relaxed);
        self.backend.notify(Scope::Recipes(space_id), self.client_id);
        Ok(())
    }

    async fn clear_recipes(&self, space_id: SpaceId) -> AppResult<()> {
        if let Some(mut docs) = self.backend.spaces.get_mut(&space_id) {
            docs.recipes.clear();
        }
        self.backend.notify(Scope::Recipes(space_id), self.client_id);
        Ok(())
    }

    // ── Members ──────────────────────────────────────────────────────

    async fn subscribe_members(
        &self,
        space_id: SpaceId,
        on_change: SnapshotFn<Vec<Member>>,
    ) -> AppResult<SubscriptionHandle> {
        Ok(self.spawn_forwarder(
            move |scope| scope == Scope::Members(space_id),
            move |backend| {
                let snapshot = backend
                    .spaces
                    .get(&space_id)
                    .map(|docs| decode_all("member", &docs.members));
                if let Some(members) = snapshot {
                    on_change(members);
                }
            },
            true,
        ))
    }

    async fn add_member(&self, member: &Member) -> AppResult<()> {
        let doc = sanitize::to_document(member)?;
        self.backend
            .with_space_doc(member.space_id, |space| space.add_member(member.user_id))?;
        if let Some(mut docs) = self.backend.spaces.get_mut(&member.space_id) {
            docs.members.insert(member.user_id, doc);
        }
        self.backend.notify(Scope::Space(member.space_id), self.client_id);
        self.backend
            .notify(Scope::Members(member.space_id), self.client_id);
        Ok(())
    }

    async fn remove_member(&self, space_id: SpaceId, user_id: UserId) -> AppResult<()> {
        self.backend
            .with_space_doc(space_id, |space| space.remove_member(user_id))?;
        if let Some(mut docs) = self.backend.spaces.get_mut(&space_id) {
            docs.members.remove(&user_id);
        }
        self.backend.notify(Scope::Space(space_id), self.client_id);
        self.backend.notify(Scope::Members(space_id), self.client_id);
        Ok(())
    }

    // ── Invites ──────────────────────────────────────────────────────

    async fn create_invite(&self, invite: &Invite) -> AppResult<()> {
        let doc = sanitize::to_document(invite)?;
        self.backend.invites.insert(invite.id, doc);
        Ok(())
    }

    async fn get_invite(&self, id: InviteId) -> AppResult<Option<Invite>> {
        Ok(self
            .backend
            .invites
            .get(&id)
            .and_then(|doc| decode("invite", &doc)))
    }

    async fn find_pending_invite(
        &self,
        space_id: SpaceId,
        invitee_email: &str,
    ) -> AppResult<Option<Invite>> {
        Ok(self
            .backend
            .invites
            .iter()
            .filter_map(|entry| decode::<Invite>("invite", &entry))
            .find(|invite| {
                invite.space_id == space_id
                    && invite.is_pending()
                    && invite.addressed_to(invitee_email)
            }))
    }

    async fn pending_invites_for_email(&self, email: &str) -> AppResult<Vec<Invite>> {
        Ok(self
            .backend
            .invites
            .iter()
            .filter_map(|entry| decode::<Invite>("invite", &entry))
            .filter(|invite| invite.is_pending() && invite.addressed_to(email))
            .collect())
    }

    async fn invites_for_space(&self, space_id: SpaceId) -> AppResult<Vec<Invite>> {
        Ok(self
            .backend
            .invites
            .iter()
            .filter_map(|entry| decode::<Invite>("invite", &entry))
            .filter(|invite| invite.space_id == space_id)
            .collect())
    }

    async fn update_invite_status(&self, id: InviteId, status: InviteStatus) -> AppResult<()> {
        let mut doc = self
            .backend
            .invites
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Invite {id} does not exist")))?;
        doc["status"] = serde_json::to_value(status)?;
        Ok(())
    }

    async fn delete_invite(&self, id: InviteId) -> AppResult<()> {
        self.backend.invites.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_entity::ListKind;
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    fn collect_into(sink: &Arc<Mutex<Vec<Vec<Item>>>>) -> SnapshotFn<Vec<Item>> {
        let sink = Arc::clone(sink);
        Arc::new(move |items| sink.lock().unwrap().push(items))
    }

    async fn settle() {
        sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_own_write_echo_is_suppressed() {
        let backend = MemorySpaceBackend::new(32);
        let writer = backend.client();
        let owner = UserId::new();
        let space_id = SpaceId::from(owner);
        writer
            .create_space(&Space::new(owner, "o@example.com"))
            .await
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = writer
            .subscribe_items(space_id, collect_into(&seen))
            .await
            .unwrap();
        settle().await;
        let initial = seen.lock().unwrap().len();

        let item = Item::new("Milk", "1", None, None, ListKind::Shopping, 0);
        writer.set_item(space_id, &item, owner).await.unwrap();
        settle().await;

        // Exactly one delivery for the write: the acknowledged snapshot,
        // not the pending echo plus the ack.
        assert_eq!(seen.lock().unwrap().len(), initial + 1);
    }

    #[tokio::test]
    async fn test_foreign_write_is_delivered() {
        let backend = MemorySpaceBackend::new(32);
        let owner_client = backend.client();
        let member_client = backend.client();
        let owner = UserId::new();
        let space_id = SpaceId::from(owner);
        owner_client
            .create_space(&Space::new(owner, "o@example.com"))
            .await
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = member_client
            .subscribe_items(space_id, collect_into(&seen))
            .await
            .unwrap();
        settle().await;

        let item = Item::new("Milk", "1", None, None, ListKind::Shopping, 0);
        owner_client.set_item(space_id, &item, owner).await.unwrap();
        settle().await;

        let snapshots = seen.lock().unwrap();
        let last = snapshots.last().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "Milk");
    }

    #[tokio::test]
    async fn test_no_initial_snapshot_for_unknown_space() {
        let backend = MemorySpaceBackend::new(32);
        let client = backend.client();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = client
            .subscribe_items(SpaceId::new(), collect_into(&seen))
            .await
            .unwrap();
        settle().await;

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_spaces_tracks_membership() {
        let backend = MemorySpaceBackend::new(32);
        let client = backend.client();
        let owner = UserId::new();
        let guest = UserId::new();
        let space = Space::new(owner, "o@example.com");
        client.create_space(&space).await.unwrap();

        assert!(client.get_user_spaces(guest).await.unwrap().is_empty());

        client
            .add_member(&Member::new(
                space.id,
                guest,
                larder_entity::MemberRole::Editor,
                "g@example.com",
            ))
            .await
            .unwrap();

        let spaces = client.get_user_spaces(guest).await.unwrap();
        assert_eq!(spaces.len(), 1);
        assert!(spaces[0].is_member(guest));
    }

    #[tokio::test]
    async fn test_pause_sets_flag() {
        let backend = MemorySpaceBackend::new(32);
        let client = backend.client();
        let owner = UserId::new();
        let space = Space::new(owner, "o@example.com");
        client.create_space(&space).await.unwrap();

        client.pause_sharing(space.id).await.unwrap();
        let paused = client.get_space(space.id).await.unwrap().unwrap();
        assert!(paused.sharing_paused);

        client.resume_sharing(space.id).await.unwrap();
        let resumed = client.get_space(space.id).await.unwrap().unwrap();
        assert!(!resumed.sharing_paused);
    }
}
