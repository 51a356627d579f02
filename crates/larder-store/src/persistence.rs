//! Durable snapshot storage.
//!
//! The whole store persists as one versioned JSON blob. Saves write to a
//! temp file in the same directory and rename over the target, so a crash
//! mid-save never corrupts the durable copy. Loads run the migration
//! chain before deserializing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use larder_core::error::AppError;
use larder_core::types::{ItemId, RecipeId};
use larder_core::AppResult;
use larder_entity::{Item, Recipe, SyncSettings};

use crate::migration::{self, SCHEMA_VERSION};
use crate::state::AppState;

/// On-disk form of the store: the root blob.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSnapshot {
    /// Schema version the blob was written with.
    version: u32,
    /// Sharing/space settings.
    #[serde(default)]
    settings: SyncSettings,
    /// Item collection.
    #[serde(default)]
    items: HashMap<ItemId, Item>,
    /// Recipe collection.
    #[serde(default)]
    recipes: HashMap<RecipeId, Recipe>,
}

/// Reads and writes the root snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store under the given data directory.
    pub fn new(data_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(file_name),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, running migrations as needed.
    ///
    /// A missing file yields the default state; an unreadable or
    /// unmigratable file yields an error and leaves the file in place for
    /// the caller to quarantine.
    pub async fn load(&self) -> AppResult<AppState> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot on disk, starting fresh");
                return Ok(AppState::default());
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::with_source(
                larder_core::error::ErrorKind::Migration,
                format!("Snapshot is not valid JSON: {e}"),
                e,
            ))?;
        let migrated = migration::migrate_to_current(value)?;

        let snapshot: PersistedSnapshot = serde_json::from_value(migrated).map_err(|e| {
            AppError::with_source(
                larder_core::error::ErrorKind::Migration,
                format!("Migrated snapshot does not match the current schema: {e}"),
                e,
            )
        })?;

        info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            recipes = snapshot.recipes.len(),
            "snapshot loaded"
        );
        Ok(AppState {
            settings: snapshot.settings,
            items: snapshot.items,
            recipes: snapshot.recipes,
        })
    }

    /// Persist the state atomically.
    pub async fn save(&self, state: &AppState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let snapshot = PersistedSnapshot {
            version: SCHEMA_VERSION,
            settings: state.settings.clone(),
            items: state.items.clone(),
            recipes: state.recipes.clone(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = json.len(), "snapshot saved");
        Ok(())
    }

    /// Move an unreadable snapshot aside so the next load starts fresh.
    ///
    /// Returns the quarantine path, or `None` if there was no file.
    pub async fn quarantine(&self) -> AppResult<Option<PathBuf>> {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let target = self.path.with_extension(format!("json.corrupt-{epoch}"));

        match fs::rename(&self.path, &target).await {
            Ok(()) => {
                info!(
                    from = %self.path.display(),
                    to = %target.display(),
                    "quarantined unreadable snapshot"
                );
                Ok(Some(target))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
