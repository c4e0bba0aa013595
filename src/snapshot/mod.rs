//! Snapshots of whole registry states.
//!
//! Backups go through a [`SnapshotStore`] (the persistence collaborator);
//! exports and imports use the portable [`ExportDocument`].

mod error;
#[cfg(feature = "store")]
mod fjall_store;
mod format;
mod persistence;
mod service;
mod version;

pub use error::SnapshotError;
#[cfg(feature = "store")]
pub use fjall_store::FjallSnapshotStore;
pub use format::{BACKUP_MAGIC, ExportDocument, decode_backup, encode_backup};
pub use persistence::{MemorySnapshotStore, SnapshotStore};
pub use service::{BACKUP_PREFIX, BackupInfo, SnapshotService};
pub use version::{FormatVersion, ParseVersionError};
