//! Synchronization status of the local device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where the device currently stands relative to its bound space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Sharing is disabled; all data is local-only.
    #[default]
    Local,
    /// A sync operation (initial upload or subscription setup) is underway.
    Syncing,
    /// Subscriptions are live and at least one snapshot has been applied.
    Synced,
    /// The last sync operation failed.
    Error,
}

impl SyncStatus {
    /// Whether the device currently mirrors a remote space.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Syncing | Self::Synced)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Syncing => write!(f, "syncing"),
            Self::Synced => write!(f, "synced"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for SyncStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "syncing" => Ok(Self::Syncing),
            "synced" => Ok(Self::Synced),
            "error" => Ok(Self::Error),
            other => Err(AppError::validation(format!(
                "Unknown sync status: {other}"
            ))),
        }
    }
}
