//! Unified error type for the component-registry library.
//!
//! Callers that use both the registry and the snapshot service can carry a
//! single [`Error`] through their code.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::snapshot::SnapshotError;

/// Unified error type for all component-registry operations.
///
/// # Example
///
/// ```ignore
/// use component_registry::{Registry, Result, NewComponent, ComponentKind};
///
/// fn add_navbar(registry: &Registry) -> Result<()> {
///     registry.add_component(NewComponent::new("Navbar", ComponentKind::Component))?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from a registry operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Error from a backup, restore, export, or import.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable code, delegated to the wrapped error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.code(),
            Self::Snapshot(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Returns `true` if this is a registry error.
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    /// Returns `true` if this is a snapshot error.
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }

    /// Returns `true` if the registry rejected the call because it is locked.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::Locked))
    }
}
