//! Error types for the registry module.

use thiserror::Error;

use super::changelog::ChangeId;
use super::types::ComponentId;

/// Errors that can occur during registry operations.
///
/// Every failing operation leaves the registry exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Registry is locked; unlock it before making changes")]
    Locked,

    #[error("Component not found: {0}")]
    NotFound(ComponentId),

    #[error("Change record not found: {0}")]
    ChangeNotFound(ChangeId),

    #[error("Change {0} cannot be rolled back: it carries no rollback payload")]
    NotReversible(ChangeId),

    #[error("Component already exists: {0}")]
    AlreadyExists(ComponentId),

    #[error("Invalid component: {0}")]
    InvalidComponent(String),
}

impl RegistryError {
    /// Stable machine-readable code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Locked => "LOCKED",
            RegistryError::NotFound(_) => "COMPONENT_NOT_FOUND",
            RegistryError::ChangeNotFound(_) => "CHANGE_NOT_FOUND",
            RegistryError::NotReversible(_) => "NOT_REVERSIBLE",
            RegistryError::AlreadyExists(_) => "ALREADY_EXISTS",
            RegistryError::InvalidComponent(_) => "INVALID_COMPONENT",
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, RegistryError::Locked)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_) | RegistryError::ChangeNotFound(_))
    }
}
