//! Local snapshot storage configuration.

use serde::{Deserialize, Serialize};

/// Where the persisted local snapshot lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot and its quarantined predecessors.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// File name of the root snapshot blob.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_snapshot_file() -> String {
    "root.json".to_string()
}
