//! The composition root.
//!
//! Wires configuration, the persisted snapshot, the remote repository,
//! and the identity provider into one running engine.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use larder_auth::IdentityProvider;
use larder_core::config::logging::LoggingConfig;
use larder_core::config::AppConfig;
use larder_core::AppResult;
use larder_remote::SpaceRepository;
use larder_store::{AppState, SnapshotStore, Store};
use larder_sync::SyncService;

/// A fully wired engine instance.
pub struct App {
    /// The configuration the engine was built with.
    pub config: AppConfig,
    /// The local store.
    pub store: Arc<Store>,
    /// The sync service.
    pub sync: SyncService,
    /// The snapshot file manager.
    pub snapshot: SnapshotStore,
    persistence: JoinHandle<()>,
    auth_watcher: JoinHandle<()>,
}

impl App {
    /// Stop background tasks and write a final snapshot.
    pub async fn shutdown(self) -> AppResult<()> {
        self.persistence.abort();
        self.auth_watcher.abort();
        self.snapshot.save(&self.store.state()).await?;
        info!("engine shut down");
        Ok(())
    }
}

/// Initialize tracing/logging.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Build and start the engine.
///
/// Loads the persisted snapshot (running migrations); an unreadable or
/// unmigratable snapshot is quarantined beside the original path and the
/// engine starts from the default state rather than failing startup.
pub async fn bootstrap(
    config: AppConfig,
    repo: Arc<dyn SpaceRepository>,
    identity: Arc<dyn IdentityProvider>,
) -> AppResult<App> {
    let snapshot = SnapshotStore::new(&config.storage.data_dir, &config.storage.snapshot_file);

    let state = match snapshot.load().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "snapshot unreadable; quarantining and starting fresh");
            snapshot.quarantine().await?;
            AppState::default()
        }
    };

    let store = Arc::new(Store::new(state));
    let sync = SyncService::new(Arc::clone(&store), repo, identity, &config.sync);

    let persistence = spawn_persistence(Arc::clone(&store), snapshot.clone());
    let auth_watcher = sync.spawn_auth_watcher();

    info!("engine started");
    Ok(App {
        config,
        store,
        sync,
        snapshot,
        persistence,
        auth_watcher,
    })
}

/// Save the snapshot after every state change.
fn spawn_persistence(store: Arc<Store>, snapshot: SnapshotStore) -> JoinHandle<()> {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = Arc::clone(&rx.borrow_and_update());
            if let Err(e) = snapshot.save(&state).await {
                warn!(error = %e, "failed to persist snapshot");
            }
        }
    })
}
