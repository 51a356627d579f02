//! The sync service: composition of store, repository, identity, and
//! the subscription orchestrator.
//!
//! Constructed with injected dependencies and owned by the application's
//! composition root. All state lives on the instance; two services over
//! two stores are fully independent.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use larder_auth::IdentityProvider;
use larder_core::config::sync::SyncConfig;
use larder_core::error::AppError;
use larder_core::events::{SpaceEvent, SyncEvent, SyncStateEvent};
use larder_core::types::{SpaceId, SyncStatus, UserId};
use larder_core::AppResult;
use larder_entity::{Item, Recipe, Space};
use larder_remote::{SnapshotFn, SpaceRepository};
use larder_store::{AppState, Applied, Command, Origin, Store};

use crate::interceptor::{self, PushOp};
use crate::orchestrator::Orchestrator;

pub(crate) struct Inner {
    pub(crate) store: Arc<Store>,
    pub(crate) repo: Arc<dyn SpaceRepository>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) orchestrator: Mutex<Orchestrator>,
    pub(crate) events: broadcast::Sender<SyncEvent>,
}

/// Handle to one sync engine. Cheap to clone.
#[derive(Clone)]
pub struct SyncService {
    pub(crate) inner: Arc<Inner>,
}

impl SyncService {
    /// Build a service from its collaborators.
    pub fn new(
        store: Arc<Store>,
        repo: Arc<dyn SpaceRepository>,
        identity: Arc<dyn IdentityProvider>,
        config: &SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                store,
                repo,
                identity,
                orchestrator: Mutex::new(Orchestrator::new()),
                events,
            }),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    /// Subscribe to engine events (notices, status changes).
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        self.inner.store.state()
    }

    // ── Command pipeline ─────────────────────────────────────────────

    /// Apply a user-initiated command.
    ///
    /// The state change is synchronous; any warranted pushes run
    /// fire-and-forget afterwards and never surface failures here.
    pub fn dispatch(&self, command: Command) -> Arc<AppState> {
        let applied = self.inner.store.apply(&command);
        self.intercept(Origin::Local, &command, &applied);
        applied.after
    }

    /// Apply a remote-originated command. Never produces pushes.
    pub(crate) fn apply_remote(&self, command: Command) -> Arc<AppState> {
        let applied = self.inner.store.apply(&command);
        self.intercept(Origin::Remote, &command, &applied);
        applied.after
    }

    /// Validate and add a recipe.
    pub fn add_recipe(&self, recipe: Recipe) -> AppResult<()> {
        recipe.validate()?;
        self.dispatch(Command::AddRecipe { recipe });
        Ok(())
    }

    /// Validate and update a recipe, bumping its edit timestamp.
    pub fn update_recipe(&self, mut recipe: Recipe) -> AppResult<()> {
        recipe.validate()?;
        recipe.touch();
        self.dispatch(Command::UpdateRecipe { recipe });
        Ok(())
    }

    /// The provenance gate and push planner.
    fn intercept(&self, origin: Origin, command: &Command, applied: &Applied) {
        if origin == Origin::Remote {
            trace!("remote-origin command, no interception");
            return;
        }
        let settings = &applied.after.settings;
        if !settings.sharing_enabled {
            return;
        }
        let Some(space_id) = settings.current_space_id else {
            return;
        };
        let Some(user) = self.inner.identity.current_user() else {
            return;
        };

        let ops = interceptor::plan(command, &applied.before, &applied.after);
        if ops.is_empty() {
            return;
        }
        debug!(space_id = %space_id, count = ops.len(), "pushing local changes");

        let service = self.clone();
        tokio::spawn(async move {
            for op in ops {
                let collection = op.collection();
                if let Err(e) = service.push(space_id, user.id, op).await {
                    // Transient push failures degrade to "will sync
                    // later"; the next command touching the entity
                    // re-pushes current state.
                    warn!(collection, error = %e, "push failed");
                    service.emit(
                        SyncStateEvent::PushFailed {
                            collection: collection.to_string(),
                            reason: e.to_string(),
                        }
                        .into(),
                    );
                }
            }
        });
    }

    async fn push(&self, space_id: SpaceId, actor_id: UserId, op: PushOp) -> AppResult<()> {
        let repo = &self.inner.repo;
        match op {
            PushOp::SetItem(item) => repo.set_item(space_id, &item, actor_id).await,
            PushOp::DeleteItem(id) => repo.delete_item(space_id, id).await,
            PushOp::SetRecipe(recipe) => repo.set_recipe(space_id, &recipe, actor_id).await,
            PushOp::DeleteRecipe(id) => repo.delete_recipe(space_id, id).await,
        }
    }

    // ── Orchestration ────────────────────────────────────────────────

    /// Bind a user (or unbind with `None`). Idempotent on the same id.
    pub async fn set_user(&self, user_id: Option<UserId>) -> AppResult<()> {
        let mut orchestrator = self.inner.orchestrator.lock().await;
        let weak = Arc::downgrade(&self.inner);
        let on_spaces: SnapshotFn<Vec<Space>> = Arc::new(move |spaces| {
            if let Some(inner) = weak.upgrade() {
                SyncService { inner }.handle_spaces_snapshot(spaces);
            }
        });
        let changed = orchestrator
            .set_user(self.inner.repo.as_ref(), user_id, on_spaces)
            .await?;
        if changed {
            info!(user_id = ?user_id, "user binding changed");
        }
        Ok(())
    }

    /// Subscribe to a space's collections, replacing any previous
    /// collection subscriptions. The space-list subscription persists.
    pub async fn start_sync(&self, space_id: SpaceId) -> AppResult<()> {
        let mut orchestrator = self.inner.orchestrator.lock().await;
        if orchestrator.user_id().is_none() {
            return Err(AppError::authentication(
                "No user bound; cannot start syncing a space",
            ));
        }

        self.dispatch(Command::SetCurrentSpace {
            space_id: Some(space_id),
        });
        self.set_status(SyncStatus::Syncing);

        let weak = Arc::downgrade(&self.inner);
        let on_items: SnapshotFn<Vec<Item>> = Arc::new(move |items| {
            if let Some(inner) = weak.upgrade() {
                SyncService { inner }.ingest_items(items);
            }
        });
        let weak = Arc::downgrade(&self.inner);
        let on_recipes: SnapshotFn<Vec<Recipe>> = Arc::new(move |recipes| {
            if let Some(inner) = weak.upgrade() {
                SyncService { inner }.ingest_recipes(recipes);
            }
        });
        orchestrator
            .bind_space(self.inner.repo.as_ref(), space_id, on_items, on_recipes)
            .await?;

        info!(space_id = %space_id, "sync started");
        Ok(())
    }

    /// Tear down every subscription and clear the space binding.
    pub async fn stop_sync(&self) {
        self.inner.orchestrator.lock().await.detach();
        self.dispatch(Command::SetCurrentSpace { space_id: None });
        info!("sync stopped");
    }

    // ── Inbound snapshots ────────────────────────────────────────────

    /// Replace the local item collection with an authoritative snapshot.
    fn ingest_items(&self, items: Vec<Item>) {
        let count = items.len();
        self.apply_remote(Command::ReplaceItems { items });
        self.set_status(SyncStatus::Synced);
        self.emit(
            SyncStateEvent::SnapshotApplied {
                collection: "items".to_string(),
                count,
            }
            .into(),
        );
    }

    /// Replace the local recipe collection with an authoritative snapshot.
    fn ingest_recipes(&self, recipes: Vec<Recipe>) {
        let count = recipes.len();
        self.apply_remote(Command::ReplaceRecipes { recipes });
        self.set_status(SyncStatus::Synced);
        self.emit(
            SyncStateEvent::SnapshotApplied {
                collection: "recipes".to_string(),
                count,
            }
            .into(),
        );
    }

    /// React to a change in the user's space list: refresh the cache and
    /// run the eviction checks for the currently bound space.
    fn handle_spaces_snapshot(&self, spaces: Vec<Space>) {
        self.apply_remote(Command::SetAvailableSpaces {
            spaces: spaces.clone(),
        });

        let Some(user) = self.inner.identity.current_user() else {
            return;
        };
        let own_space = SpaceId::from(user.id);
        let state = self.inner.store.state();
        let Some(current) = state.settings.current_space_id else {
            return;
        };
        if current == own_space {
            return;
        }

        let eviction = match spaces.iter().find(|s| s.id == current) {
            None => Some(SpaceEvent::EvictedFromLostSpace { space_id: current }),
            Some(space) if space.sharing_paused => {
                Some(SpaceEvent::EvictedFromPausedSpace { space_id: current })
            }
            Some(_) => None,
        };
        let Some(event) = eviction else {
            return;
        };

        warn!(space_id = %current, "bound space no longer usable, switching home");
        self.emit(event.into());

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.start_sync(own_space).await {
                warn!(error = %e, "failed to switch back to own space");
                service.set_status(SyncStatus::Error);
            }
        });
    }

    // ── Auth wiring ──────────────────────────────────────────────────

    /// Follow the identity provider's auth state: bind on sign-in
    /// (resuming a persisted space binding, if any), reset on sign-out.
    pub fn spawn_auth_watcher(&self) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let mut rx = self.inner.identity.auth_state();
        tokio::spawn(async move {
            loop {
                let user_id = rx.borrow_and_update().as_ref().map(|u| u.id);
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let service = SyncService { inner };
                match user_id {
                    Some(id) => {
                        if let Err(e) = service.set_user(Some(id)).await {
                            warn!(error = %e, "failed to bind signed-in user");
                        } else {
                            service.resume_persisted_binding(id).await;
                        }
                    }
                    None => {
                        if let Err(e) = service.set_user(None).await {
                            warn!(error = %e, "failed to unbind user");
                        }
                        service.apply_remote(Command::ResetSettings);
                    }
                }
                drop(service);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Reconnect to the space the previous run was bound to.
    async fn resume_persisted_binding(&self, user_id: UserId) {
        let settings = self.inner.store.state().settings.clone();
        if !settings.sharing_enabled {
            return;
        }
        let space_id = settings
            .current_space_id
            .unwrap_or_else(|| SpaceId::from(user_id));
        if let Err(e) = self.start_sync(space_id).await {
            warn!(space_id = %space_id, error = %e, "failed to resume sync");
            self.set_status(SyncStatus::Error);
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Set the sync status, emitting an event when it changes.
    pub(crate) fn set_status(&self, status: SyncStatus) {
        if self.inner.store.state().settings.sync_status == status {
            return;
        }
        self.apply_remote(Command::SetSyncStatus { status });
        self.emit(SyncStateEvent::StatusChanged { status }.into());
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        // Nobody listening is fine.
        let _ = self.inner.events.send(event);
    }
}

impl PushOp {
    /// Which remote collection the operation targets.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::SetItem(_) | Self::DeleteItem(_) => "items",
            Self::SetRecipe(_) | Self::DeleteRecipe(_) => "recipes",
        }
    }
}
