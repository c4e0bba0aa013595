//! Application state management.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::registry::{Registry, RegistryError};
use crate::snapshot::{FjallSnapshotStore, SnapshotError, SnapshotService, SnapshotStore};

use super::config::Config;
use super::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    snapshots: Arc<SnapshotService>,
    snapshot_timeout: Duration,
}

impl AppState {
    /// Build the registry and open (or create) the snapshot store named in
    /// the configuration.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let store = Self::open_or_init_store(&config.storage.path)?;
        let registry = Registry::seeded(config.registry.seed.iter().cloned())
            .map_err(StateError::Seed)?
            .with_rollback_policy(config.registry.rollback_policy());

        Ok(Self::new(
            registry,
            Arc::new(store),
            config.storage.snapshot_timeout(),
        ))
    }

    /// Assemble state from parts; tests use this with an in-memory store.
    pub fn new(
        registry: Registry,
        store: Arc<dyn SnapshotStore>,
        snapshot_timeout: Duration,
    ) -> Self {
        let registry = Arc::new(registry);
        let snapshots = Arc::new(SnapshotService::new(Arc::clone(&registry), store));
        Self {
            registry,
            snapshots,
            snapshot_timeout,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn snapshot_timeout(&self) -> Duration {
        self.snapshot_timeout
    }

    /// Run a snapshot operation on the blocking pool, bounded by the
    /// configured timeout.
    ///
    /// On timeout the caller gets a 504, but the operation itself is not
    /// cancelled. Whatever it does still happens atomically under the
    /// registry's write lock.
    pub async fn run_snapshot<T, F>(&self, operation: &'static str, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&SnapshotService) -> Result<T, SnapshotError> + Send + 'static,
    {
        let snapshots = Arc::clone(&self.snapshots);
        let task = tokio::task::spawn_blocking(move || f(&snapshots));

        match tokio::time::timeout(self.snapshot_timeout, task).await {
            Ok(Ok(result)) => result.map_err(ApiError::from),
            Ok(Err(join_error)) => Err(ApiError::internal(format!(
                "{} task failed: {}",
                operation, join_error
            ))),
            Err(_) => {
                tracing::warn!(operation, "snapshot operation timed out");
                let timeout_ms = u64::try_from(self.snapshot_timeout.as_millis()).unwrap_or(u64::MAX);
                Err(ApiError::snapshot_timeout(operation, timeout_ms))
            }
        }
    }

    fn open_or_init_store(path: &str) -> Result<FjallSnapshotStore, StateError> {
        if Path::new(path).exists() {
            FjallSnapshotStore::open(path).map_err(|e| StateError::OpenStore {
                path: path.to_string(),
                source: e,
            })
        } else {
            FjallSnapshotStore::init(path).map_err(|e| StateError::InitStore {
                path: path.to_string(),
                source: e,
            })
        }
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// Failed to open an existing snapshot store.
    OpenStore { path: String, source: SnapshotError },
    /// Failed to initialize a new snapshot store.
    InitStore { path: String, source: SnapshotError },
    /// A seed component was rejected.
    Seed(RegistryError),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::OpenStore { path, source } => {
                write!(f, "Failed to open snapshot store at '{}': {}", path, source)
            }
            StateError::InitStore { path, source } => {
                write!(f, "Failed to initialize snapshot store at '{}': {}", path, source)
            }
            StateError::Seed(e) => write!(f, "Invalid seed component: {}", e),
        }
    }
}

impl std::error::Error for StateError {}
