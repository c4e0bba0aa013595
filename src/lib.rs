//! A versioned component registry.
//!
//! The registry tracks named artifacts (components, pages, features, styles,
//! assets), records every mutation in an append-only change log, can roll
//! back reversible changes, and can be locked against further mutation.
//! Whole states move in and out through backups and a portable export
//! document.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use component_registry::prelude::*;
//!
//! let registry = Arc::new(Registry::new());
//! let navbar = registry.add_component(
//!     NewComponent::new("Navbar", ComponentKind::Component).with_size(12.5),
//! )?;
//!
//! let snapshots = SnapshotService::new(registry.clone(), Arc::new(MemorySnapshotStore::new()));
//! let backup = snapshots.create_backup()?;
//!
//! registry.remove_component(&navbar.id)?;
//! snapshots.restore_backup(&backup.key)?;
//! ```
//!
//! # Modules
//!
//! - [`registry`] - Components, change log, rollback, and bulk actions
//! - [`snapshot`] - Backups, restore, export, and import
//! - [`server`] - HTTP API (requires `server` feature)
//!
//! # Feature Flags
//!
//! - `store` - fjall-backed snapshot store (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `server` - Enable the HTTP API server
//! - `full` - Enable all features

#[macro_use]
pub(crate) mod logging;
pub mod prelude;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
pub mod snapshot;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

// Re-export the main types at crate root for convenience
pub use registry::{
    BulkAction, BulkReport, ChangeId, ChangeKind, ChangeRecord, Component, ComponentFilter,
    ComponentId, ComponentKind, ComponentPatch, ComponentStatus, NewComponent, Registry,
    RegistryError, RegistryState, RegistryStats, RollbackPolicy,
};
#[cfg(feature = "store")]
pub use snapshot::FjallSnapshotStore;
pub use snapshot::{
    BackupInfo, ExportDocument, MemorySnapshotStore, SnapshotError, SnapshotService,
    SnapshotStore,
};
