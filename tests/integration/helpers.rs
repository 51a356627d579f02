//! Shared test helpers for integration tests.

use std::sync::Arc;

use larder::{
    AppState, AuthUser, IdentityProvider, ListKind, MemoryIdentity, MemorySpaceBackend, Store,
    SyncEvent, SyncService,
};
use larder_core::config::sync::SyncConfig;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout, Duration};

/// One shared backend, many devices.
pub struct TestEnv {
    /// The in-process document store shared by every device.
    pub backend: Arc<MemorySpaceBackend>,
}

/// One device: its own identity session, store, and sync engine.
pub struct TestDevice {
    /// The device's identity session.
    pub identity: Arc<MemoryIdentity>,
    /// The device's local store.
    pub store: Arc<Store>,
    /// The device's sync engine.
    pub sync: SyncService,
    /// The signed-in user.
    pub user: AuthUser,
}

impl TestEnv {
    /// Create an environment with a fresh backend.
    pub fn new() -> Self {
        Self {
            backend: MemorySpaceBackend::new(256),
        }
    }

    /// Boot a device with its own signed-in account.
    pub async fn device(&self, email: &str) -> TestDevice {
        let identity = Arc::new(MemoryIdentity::new());
        identity.register(email, "password123");
        let user = identity.sign_in(email, "password123").await.unwrap();

        let store = Arc::new(Store::new(AppState::default()));
        let sync = SyncService::new(
            Arc::clone(&store),
            Arc::new(self.backend.client()),
            identity.clone(),
            &SyncConfig::default(),
        );
        sync.set_user(Some(user.id)).await.unwrap();

        TestDevice {
            identity,
            store,
            sync,
            user,
        }
    }
}

impl TestDevice {
    /// Dispatch an add-item command on this device.
    pub fn add_item(&self, name: &str, list: ListKind) {
        self.sync.dispatch(larder::Command::AddItem {
            name: name.into(),
            quantity: "1".into(),
            unit: None,
            category: None,
            list,
        });
    }
}

/// Let spawned forwarders and pushes drain.
pub async fn settle() {
    sleep(Duration::from_millis(60)).await;
}

/// Wait until an event matching the predicate arrives.
pub async fn expect_event(
    rx: &mut broadcast::Receiver<SyncEvent>,
    matches: impl Fn(&SyncEvent) -> bool,
) -> SyncEvent {
    timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(event) if matches(&event) => return event,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("expected event did not arrive")
}
