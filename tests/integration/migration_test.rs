//! Cold-start behavior: snapshot migration, quarantine, persistence.

use std::sync::Arc;

use larder::{bootstrap, AppConfig, ListKind, MemoryIdentity, MemorySpaceBackend};
use larder_core::config::storage::StorageConfig;

fn config_for(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        storage: StorageConfig {
            data_dir: dir.display().to_string(),
            snapshot_file: "root.json".to_string(),
        },
        ..AppConfig::default()
    }
}

async fn boot(dir: &std::path::Path) -> larder::App {
    let backend = MemorySpaceBackend::new(32);
    bootstrap(
        config_for(dir),
        Arc::new(backend.client()),
        Arc::new(MemoryIdentity::new()),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_cold_start_merges_legacy_split_lists() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = serde_json::json!({
        "version": 1,
        "settings": {},
        "pantry_items": [{
            "id": uuid::Uuid::new_v4().to_string(),
            "name": "Milk",
            "quantity": "2",
            "unit": "l",
            "category": "dairy",
            "added_at": "2024-05-01T10:00:00Z",
            "order": 0
        }],
        "shopping_items": [{
            "id": uuid::Uuid::new_v4().to_string(),
            "name": "milk",
            "quantity": "1",
            "completed": false,
            "created_at": "2024-05-02T09:00:00Z",
            "order": 0
        }],
        "recipes": {}
    });
    std::fs::write(dir.path().join("root.json"), legacy.to_string()).unwrap();

    let app = boot(dir.path()).await;
    let state = app.store.state();

    // "Milk" and "milk" merged into one item carrying both memberships,
    // pantry-side core fields winning.
    assert_eq!(state.items.len(), 1);
    let item = state.item_by_name("milk").unwrap();
    assert_eq!(item.name, "Milk");
    assert_eq!(item.quantity, "2");
    assert_eq!(item.category, "dairy");
    assert!(item.membership.pantry.is_some());
    assert!(item.membership.shopping.is_some());

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_snapshot_is_quarantined() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("root.json"), b"{definitely not json").unwrap();

    let app = boot(dir.path()).await;
    assert!(app.store.state().items.is_empty());
    app.shutdown().await.unwrap();

    let quarantined = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| {
            e.file_name()
                .to_string_lossy()
                .contains("corrupt")
        });
    assert!(quarantined, "corrupt snapshot was not preserved");
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let app = boot(dir.path()).await;
    app.sync.dispatch(larder::Command::AddItem {
        name: "Flour".into(),
        quantity: "1".into(),
        unit: Some("kg".into()),
        category: None,
        list: ListKind::Pantry,
    });
    app.shutdown().await.unwrap();

    let app = boot(dir.path()).await;
    let state = app.store.state();
    assert_eq!(state.items.len(), 1);
    let item = state.item_by_name("Flour").unwrap();
    assert_eq!(item.unit.as_deref(), Some("kg"));
    assert_eq!(item.category, "other");
    app.shutdown().await.unwrap();
}
