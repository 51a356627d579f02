//! Local sync settings, persisted as part of the root snapshot.

use serde::{Deserialize, Serialize};

use larder_core::types::{SpaceId, SyncStatus};

use crate::space::Space;

/// Process-wide sharing/space state of this device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Whether sharing is enabled on this device.
    pub sharing_enabled: bool,
    /// The space the device is currently bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_space_id: Option<SpaceId>,
    /// Cache of the spaces the signed-in user belongs to.
    #[serde(default)]
    pub available_spaces: Vec<Space>,
    /// Current sync status.
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl SyncSettings {
    /// Disable sharing. Cascades: clears the bound space and sets the
    /// status back to local.
    pub fn disable_sharing(&mut self) {
        self.sharing_enabled = false;
        self.current_space_id = None;
        self.sync_status = SyncStatus::Local;
    }

    /// Full reset, run when the user signs out: disable sharing and drop
    /// the cached space list.
    pub fn reset_to_local(&mut self) {
        self.disable_sharing();
        self.available_spaces.clear();
    }

    /// Look up a cached space by id.
    pub fn space(&self, id: SpaceId) -> Option<&Space> {
        self.available_spaces.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::types::UserId;

    #[test]
    fn test_disable_sharing_cascades() {
        let owner = UserId::new();
        let mut settings = SyncSettings {
            sharing_enabled: true,
            current_space_id: Some(SpaceId::from(owner)),
            available_spaces: vec![Space::new(owner, "o@example.com")],
            sync_status: SyncStatus::Synced,
        };

        settings.disable_sharing();
        assert!(!settings.sharing_enabled);
        assert!(settings.current_space_id.is_none());
        assert_eq!(settings.sync_status, SyncStatus::Local);
        // The cached space list survives a mere disable.
        assert_eq!(settings.available_spaces.len(), 1);
    }

    #[test]
    fn test_reset_to_local_clears_cache() {
        let owner = UserId::new();
        let mut settings = SyncSettings {
            sharing_enabled: true,
            current_space_id: Some(SpaceId::from(owner)),
            available_spaces: vec![Space::new(owner, "o@example.com")],
            sync_status: SyncStatus::Synced,
        };

        settings.reset_to_local();
        assert!(settings.available_spaces.is_empty());
    }
}
