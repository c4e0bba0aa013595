//! Error types for the snapshot module.

use thiserror::Error;

/// Errors that can occur while moving registry state in or out.
///
/// Restore and import never leave a partially replaced registry behind: if
/// any of these is returned, the in-memory state is what it was before the
/// call.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "store")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("Corrupt backup '{key}': {reason}")]
    CorruptBackup { key: String, reason: String },

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Snapshot store not initialized at {0}")]
    NotInitialized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SnapshotError {
    /// Stable machine-readable code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotError::BackupNotFound(_) => "BACKUP_NOT_FOUND",
            SnapshotError::CorruptBackup { .. } => "CORRUPT_BACKUP",
            SnapshotError::Import(_) => "IMPORT_ERROR",
            SnapshotError::InvalidFormat(_) => "INVALID_FORMAT",
            SnapshotError::NotInitialized(_) => "STORE_NOT_INITIALIZED",
            SnapshotError::Io(_) | SnapshotError::Storage(_) | SnapshotError::Serialize(_) => {
                "STORAGE_ERROR"
            }
            #[cfg(feature = "store")]
            SnapshotError::Fjall(_) => "STORAGE_ERROR",
        }
    }

    pub(crate) fn corrupt(key: &str, reason: impl Into<String>) -> Self {
        SnapshotError::CorruptBackup {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
