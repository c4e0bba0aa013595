//! Snapshot store backed by fjall.

use std::path::Path;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::logging::{debug, error, info, trace};

use super::error::SnapshotError;
use super::persistence::SnapshotStore;

const META_KEYSPACE: &str = "_meta";
const META_CONFIG_KEY: &str = "config";
const SNAPSHOT_KEYSPACE: &str = "snapshots";

/// Current on-disk layout version.
/// Increment this when changing keyspace names or blob framing.
/// Opening a directory written with a different version fails.
const STORE_VERSION: u32 = 1;

/// Durable snapshot storage in an LSM-tree database.
///
/// Every `put` is synced to disk before it returns, so a backup reported as
/// created survives a crash.
///
/// # Example
///
/// ```ignore
/// use component_registry::snapshot::{FjallSnapshotStore, SnapshotStore};
///
/// let store = FjallSnapshotStore::open_or_init(".component-registry")?;
/// store.put("backup/1", b"...")?;
/// ```
pub struct FjallSnapshotStore {
    db: fjall::Database,
    snapshots: Keyspace,
}

impl FjallSnapshotStore {
    /// Open an existing store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening snapshot store");

        if !path.exists() {
            error!(path = %path.display(), "store path does not exist");
            return Err(SnapshotError::NotInitialized(path.display().to_string()));
        }

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace(META_KEYSPACE, KeyspaceCreateOptions::default)?;

        let Some(config) = meta.get(META_CONFIG_KEY)? else {
            error!(path = %path.display(), "store not initialized - no config found");
            return Err(SnapshotError::NotInitialized(path.display().to_string()));
        };
        let version = u32::from_le_bytes(
            config
                .as_ref()
                .try_into()
                .map_err(|_| SnapshotError::InvalidFormat("Invalid config format".to_string()))?,
        );
        if version != STORE_VERSION {
            error!(
                stored_version = version,
                expected_version = STORE_VERSION,
                "store version mismatch"
            );
            return Err(SnapshotError::InvalidFormat(format!(
                "Store version mismatch: expected {}, got {}",
                STORE_VERSION, version
            )));
        }
        trace!(version = version, "store version verified");

        let snapshots = db.keyspace(SNAPSHOT_KEYSPACE, KeyspaceCreateOptions::default)?;
        info!(path = %path.display(), "snapshot store opened");
        Ok(Self { db, snapshots })
    }

    /// Initialize a new store at the given path.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "initializing snapshot store");

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace(META_KEYSPACE, KeyspaceCreateOptions::default)?;
        meta.insert(META_CONFIG_KEY, STORE_VERSION.to_le_bytes())?;
        let snapshots = db.keyspace(SNAPSHOT_KEYSPACE, KeyspaceCreateOptions::default)?;
        db.persist(PersistMode::SyncAll)?;

        info!(path = %path.display(), version = STORE_VERSION, "snapshot store initialized");
        Ok(Self { db, snapshots })
    }

    /// Open the store if the path exists, otherwise initialize it.
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::init(path)
        }
    }
}

impl SnapshotStore for FjallSnapshotStore {
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), SnapshotError> {
        trace!(key = key, bytes = blob.len(), "writing snapshot blob");
        self.snapshots.insert(key, blob)?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        Ok(self.snapshots.get(key)?.map(|v| v.to_vec()))
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, SnapshotError> {
        let mut keys = Vec::new();
        for kv in self.snapshots.prefix(prefix) {
            let Ok(key_bytes) = kv.key() else {
                continue;
            };
            keys.push(String::from_utf8_lossy(&key_bytes).into_owned());
        }
        Ok(keys)
    }
}
