//! Shared registry service.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::logging::info;

use super::bulk::{BulkAction, BulkReport};
use super::changelog::{ChangeId, ChangeRecord};
use super::error::RegistryError;
use super::query::{ComponentFilter, RegistryStats};
use super::rollback::RollbackPolicy;
use super::state::RegistryState;
use super::types::{Component, ComponentId, ComponentPatch, NewComponent};

/// The single source of truth for components and lock state.
///
/// `Registry` owns one [`RegistryState`] behind a reader/writer lock. Every
/// mutation, including a whole bulk action, runs under the write lock, so
/// readers never see a half-applied change and concurrent writers cannot
/// interleave.
///
/// # Example
///
/// ```ignore
/// use component_registry::prelude::*;
///
/// let registry = Registry::new();
/// let navbar = registry.add_component(
///     NewComponent::new("Navbar", ComponentKind::Component).with_size(12.5),
/// )?;
/// registry.remove_component(&navbar.id)?;
///
/// let removal = registry.changes()[0].id;
/// registry.rollback(removal)?;
/// assert_eq!(registry.total_size(), 12.5);
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
    rollback_policy: RollbackPolicy,
}

impl Registry {
    /// An empty, unlocked registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: RegistryState) -> Self {
        Self {
            state: RwLock::new(state),
            rollback_policy: RollbackPolicy::default(),
        }
    }

    /// Start from seed components (no change records are written).
    pub fn seeded<I>(seed: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = NewComponent>,
    {
        let state = RegistryState::seeded(seed)?;
        info!(components = state.len(), "registry seeded");
        Ok(Self::from_state(state))
    }

    pub fn with_rollback_policy(mut self, policy: RollbackPolicy) -> Self {
        self.rollback_policy = policy;
        self
    }

    pub fn rollback_policy(&self) -> RollbackPolicy {
        self.rollback_policy
    }

    // Mutations

    pub fn add_component(&self, spec: NewComponent) -> Result<Component, RegistryError> {
        self.state.write().add_component(spec)
    }

    pub fn remove_component(&self, id: &ComponentId) -> Result<Component, RegistryError> {
        self.state.write().remove_component(id)
    }

    pub fn update_component(
        &self,
        id: &ComponentId,
        patch: ComponentPatch,
    ) -> Result<Component, RegistryError> {
        self.state.write().update_component(id, patch)
    }

    pub fn toggle_status(&self, id: &ComponentId) -> Result<Component, RegistryError> {
        self.state.write().toggle_status(id)
    }

    pub fn rename_component(
        &self,
        id: &ComponentId,
        name: impl Into<String>,
    ) -> Result<Component, RegistryError> {
        self.state.write().rename_component(id, name)
    }

    pub fn lock(&self) {
        self.state.write().lock();
    }

    pub fn unlock(&self) {
        self.state.write().unlock();
    }

    /// Undo a reversible change under the configured [`RollbackPolicy`].
    pub fn rollback(&self, change_id: ChangeId) -> Result<Component, RegistryError> {
        self.state.write().rollback(change_id, self.rollback_policy)
    }

    pub fn bulk_action(
        &self,
        ids: &[ComponentId],
        action: BulkAction,
    ) -> Result<BulkReport, RegistryError> {
        self.state.write().bulk_action(ids, action)
    }

    /// Swap in a whole new state, returning the old one.
    pub(crate) fn replace_state(&self, state: RegistryState) -> RegistryState {
        std::mem::replace(&mut *self.state.write(), state)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write()
    }

    // Reads

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read()
    }

    /// A consistent copy of the whole state.
    pub fn snapshot(&self) -> RegistryState {
        self.state.read().clone()
    }

    pub fn component(&self, id: &ComponentId) -> Option<Component> {
        self.state.read().component(id).cloned()
    }

    pub fn components(&self, filter: &ComponentFilter) -> Vec<Component> {
        self.state.read().query(filter)
    }

    /// Change records, newest first.
    pub fn changes(&self) -> Vec<ChangeRecord> {
        self.state.read().change_log().newest_first().cloned().collect()
    }

    pub fn change(&self, id: ChangeId) -> Option<ChangeRecord> {
        self.state.read().change_log().get(id).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        self.state.read().stats()
    }

    pub fn is_locked(&self) -> bool {
        self.state.read().is_locked()
    }

    pub fn total_size(&self) -> f64 {
        self.state.read().total_size()
    }

    pub fn backup_count(&self) -> u64 {
        self.state.read().backup_count()
    }
}
