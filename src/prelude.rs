//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use component_registry::prelude::*;
//!
//! let registry = Registry::new();
//! registry.add_component(NewComponent::new("Hero", ComponentKind::Page).with_size(8.0))?;
//! registry.lock();
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Registry types
pub use crate::registry::{
    BulkAction, BulkReport, BulkSkip, ChangeId, ChangeKind, ChangeLog, ChangeRecord, Component,
    ComponentFilter, ComponentId, ComponentKind, ComponentPatch, ComponentStatus, NewComponent,
    Registry, RegistryError, RegistryState, RegistryStats, RollbackPolicy, SkipReason,
};

// Snapshot types
pub use crate::snapshot::{
    BackupInfo, ExportDocument, FormatVersion, MemorySnapshotStore, SnapshotError,
    SnapshotService, SnapshotStore,
};

// Persistent store (requires "store" feature)
#[cfg(feature = "store")]
pub use crate::snapshot::FjallSnapshotStore;
