//! Best-effort undo driven by change-log payloads.

use serde::{Deserialize, Serialize};

use crate::logging::{debug, info, warn};

use super::changelog::ChangeId;
use super::error::RegistryError;
use super::state::RegistryState;
use super::types::Component;

/// Whether rollback honours the registry lock.
///
/// Rollback is an administrative recovery action and by default works even
/// while the registry is locked. `RespectLock` makes it fail with
/// [`RegistryError::Locked`] like every other mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollbackPolicy {
    #[default]
    IgnoreLock,
    RespectLock,
}

impl RollbackPolicy {
    pub fn from_respect_lock(respect_lock: bool) -> Self {
        if respect_lock {
            RollbackPolicy::RespectLock
        } else {
            RollbackPolicy::IgnoreLock
        }
    }
}

impl RegistryState {
    /// Undo the change with the given id, if it carries a rollback payload.
    ///
    /// Only removals are reversible: the removed component comes back under
    /// its original id with every field intact, and a new `added` record is
    /// appended. The original record is left as it was.
    pub fn rollback(
        &mut self,
        change_id: ChangeId,
        policy: RollbackPolicy,
    ) -> Result<Component, RegistryError> {
        debug!(change = %change_id, policy = ?policy, "rolling back change");
        if policy == RollbackPolicy::RespectLock {
            self.ensure_unlocked()?;
        }

        let record = self
            .change_log
            .get(change_id)
            .ok_or(RegistryError::ChangeNotFound(change_id))?;
        let Some(payload) = record.rollback_payload.clone() else {
            warn!(change = %change_id, kind = %record.kind, "change is not reversible");
            return Err(RegistryError::NotReversible(change_id));
        };

        let description = format!(
            "Restored {} '{}' (rollback of change {})",
            payload.kind, payload.name, change_id
        );
        let restored = self.restore_component(payload, description)?;

        info!(change = %change_id, id = %restored.id, "change rolled back");
        Ok(restored)
    }
}
