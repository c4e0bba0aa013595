//! One action applied across many components.
//!
//! Items are processed in the order given and each succeeds or fails on its
//! own; a failure never undoes earlier items or stops later ones.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logging::{debug, info, warn};

use super::error::RegistryError;
use super::state::RegistryState;
use super::types::{ComponentId, ComponentPatch, ComponentStatus};

/// Action applied to every id in a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum BulkAction {
    Activate,
    Deactivate,
    Remove,
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::Remove => "remove",
        };
        f.pad(s)
    }
}

/// Why an item was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    NotFound,
    Locked,
    Rejected(String),
}

impl From<RegistryError> for SkipReason {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => SkipReason::NotFound,
            RegistryError::Locked => SkipReason::Locked,
            other => SkipReason::Rejected(other.to_string()),
        }
    }
}

/// An id the action could not be applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkSkip {
    pub id: ComponentId,
    pub reason: SkipReason,
}

/// Item-by-item outcome of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReport {
    pub action: BulkAction,
    pub applied: Vec<ComponentId>,
    pub skipped: Vec<BulkSkip>,
}

impl BulkReport {
    fn new(action: BulkAction) -> Self {
        Self {
            action,
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl RegistryState {
    /// Apply `action` to each id in turn.
    ///
    /// `remove` is rejected as a whole with [`RegistryError::Locked`] when the
    /// registry is locked. `activate` and `deactivate` are not gated up
    /// front; each underlying update reports `Locked` for its own item.
    pub fn bulk_action(
        &mut self,
        ids: &[ComponentId],
        action: BulkAction,
    ) -> Result<BulkReport, RegistryError> {
        debug!(action = %action, count = ids.len(), "bulk action");
        if action == BulkAction::Remove {
            self.ensure_unlocked()?;
        }

        let mut report = BulkReport::new(action);
        for id in ids {
            let outcome = match action {
                BulkAction::Activate => self
                    .update_component(id, ComponentPatch::status(ComponentStatus::Active))
                    .map(|_| ()),
                BulkAction::Deactivate => self
                    .update_component(id, ComponentPatch::status(ComponentStatus::Inactive))
                    .map(|_| ()),
                BulkAction::Remove => self.remove_component(id).map(|_| ()),
            };
            match outcome {
                Ok(()) => report.applied.push(id.clone()),
                Err(err) => {
                    warn!(id = %id, error = %err, "bulk item skipped");
                    report.skipped.push(BulkSkip {
                        id: id.clone(),
                        reason: err.into(),
                    });
                }
            }
        }

        info!(
            action = %action,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "bulk action finished"
        );
        Ok(report)
    }
}
