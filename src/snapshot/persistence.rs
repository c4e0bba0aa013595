//! Persistence collaborator interface.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::SnapshotError;

/// Narrow key/blob storage used by the snapshot service.
///
/// Implementations must be safe to share between threads; the service never
/// holds more than one call open at a time per operation.
pub trait SnapshotStore: Send + Sync {
    /// Store `blob` under `key`, replacing any previous value.
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), SnapshotError>;

    /// Fetch the blob under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError>;

    /// Keys starting with `prefix`, in ascending order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, SnapshotError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), SnapshotError> {
        (**self).put(key, blob)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        (**self).get(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, SnapshotError> {
        (**self).keys(prefix)
    }
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), SnapshotError> {
        self.entries.lock().insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, SnapshotError> {
        Ok(self
            .entries
            .lock()
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
