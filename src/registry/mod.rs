//! Versioned component registry.
//!
//! This module holds the in-memory registry: components, the append-only
//! change log, the lock flag, and the operations that mutate them. It has no
//! I/O of its own; see [`crate::snapshot`] for persistence.

mod bulk;
mod changelog;
mod error;
mod query;
mod rollback;
mod state;
mod store;
mod types;

pub use bulk::{BulkAction, BulkReport, BulkSkip, SkipReason};
pub use changelog::{ChangeId, ChangeKind, ChangeLog, ChangeOrderError, ChangeRecord};
pub use error::RegistryError;
pub use query::{ComponentFilter, RegistryStats};
pub use rollback::RollbackPolicy;
pub use state::RegistryState;
pub use store::Registry;
pub use types::{
    Component, ComponentId, ComponentKind, ComponentPatch, ComponentStatus, NewComponent,
    Timestamp, now_millis,
};
