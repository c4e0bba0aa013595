//! Backup, restore, export, and import of whole registry states.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logging::{debug, error, info, warn};
use crate::registry::{Registry, RegistryStats, Timestamp, now_millis};

use super::error::SnapshotError;
use super::format::{ExportDocument, decode_backup, encode_backup};
use super::persistence::SnapshotStore;

/// Key prefix under which backups are stored.
pub const BACKUP_PREFIX: &str = "backup/";

/// Result of a successful backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub key: String,
    pub created_at: Timestamp,
    pub backup_count: u64,
}

/// Moves registry state to and from the persistence collaborator and the
/// portable export document.
///
/// The service is the only component that talks to the [`SnapshotStore`].
/// Operations that replace state take the registry's write lock for the
/// swap, and they validate the incoming document completely before that,
/// so a failed restore or import changes nothing.
pub struct SnapshotService {
    registry: Arc<Registry>,
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotService {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Serialize the registry under a time-derived key and bump `backupCount`.
    ///
    /// The stored document already carries the new count. If the store
    /// rejects the write, the count is left alone.
    pub fn create_backup(&self) -> Result<BackupInfo, SnapshotError> {
        let mut state = self.registry.write();
        let now = now_millis();

        let mut document = ExportDocument::from_state(&state, now);
        document.backup_count += 1;
        let key = backup_key(now, document.backup_count);
        debug!(key = %key, "creating backup");

        let blob = encode_backup(&document)?;
        if let Err(e) = self.store.put(&key, &blob) {
            error!(key = %key, error = %e, "backup write failed");
            return Err(e);
        }
        let backup_count = state.record_backup();

        info!(key = %key, bytes = blob.len(), backup_count = backup_count, "backup created");
        Ok(BackupInfo {
            key,
            created_at: now,
            backup_count,
        })
    }

    /// Replace the whole registry with the backup stored under `key`.
    ///
    /// The lock flag comes from the backup too, so a restore may lock or
    /// unlock the registry.
    pub fn restore_backup(&self, key: &str) -> Result<RegistryStats, SnapshotError> {
        debug!(key = key, "restoring backup");
        let Some(blob) = self.store.get(key)? else {
            warn!(key = key, "backup not found");
            return Err(SnapshotError::BackupNotFound(key.to_string()));
        };

        let document = decode_backup(&blob).map_err(|reason| {
            error!(key = key, reason = %reason, "backup is corrupt");
            SnapshotError::corrupt(key, reason)
        })?;
        let state = document.into_state().map_err(|e| {
            error!(key = key, error = %e, "backup does not describe a valid registry");
            SnapshotError::corrupt(key, e.to_string())
        })?;

        let stats = state.stats();
        self.registry.replace_state(state);
        info!(key = key, components = stats.component_count, "backup restored");
        Ok(stats)
    }

    /// Backup keys, oldest first.
    pub fn list_backups(&self) -> Result<Vec<String>, SnapshotError> {
        self.store.keys(BACKUP_PREFIX)
    }

    /// Capture the current registry as a portable document. Read-only.
    pub fn export_project(&self) -> ExportDocument {
        let state = self.registry.read();
        ExportDocument::from_state(&state, now_millis())
    }

    /// [`export_project`](Self::export_project) rendered as JSON text.
    pub fn export_json(&self) -> Result<String, SnapshotError> {
        self.export_project().to_json()
    }

    /// Replace the whole registry with the one described by `input`.
    pub fn import_project(&self, input: &str) -> Result<RegistryStats, SnapshotError> {
        let document = ExportDocument::from_json(input).inspect_err(|_e| {
            warn!(error = %_e, "import rejected");
        })?;
        self.import_document(document)
    }

    /// Like [`import_project`](Self::import_project) for an already parsed
    /// document.
    pub fn import_document(&self, document: ExportDocument) -> Result<RegistryStats, SnapshotError> {
        let state = document.into_state().inspect_err(|_e| {
            warn!(error = %_e, "import rejected");
        })?;
        let stats = state.stats();
        self.registry.replace_state(state);
        info!(components = stats.component_count, "project imported");
        Ok(stats)
    }
}

/// Sortable, time-derived backup key.
fn backup_key(now: Timestamp, sequence: u64) -> String {
    format!("{}{:013}-{:06}", BACKUP_PREFIX, now, sequence)
}
