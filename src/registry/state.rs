//! The registry aggregate root and its single-item mutations.
//!
//! Every mutation here is all-or-nothing: validation and lock checks happen
//! before anything is touched, and a successful call appends exactly one
//! change record. [`Registry`](super::Registry) wraps this type behind a
//! reader/writer lock for shared use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logging::{debug, info, warn};

use super::changelog::{ChangeKind, ChangeLog, PendingChange};
use super::error::RegistryError;
use super::types::{Component, ComponentId, ComponentPatch, NewComponent, Timestamp, now_millis, validate_name};

/// Aggregate registry state: components, history, lock flag, counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryState {
    pub(crate) components: BTreeMap<ComponentId, Component>,
    pub(crate) change_log: ChangeLog,
    pub(crate) is_locked: bool,
    pub(crate) backup_count: u64,
    pub(crate) total_size: f64,
}

impl RegistryState {
    /// An empty, unlocked registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with seed components. Seeding is not a change,
    /// so the log starts empty.
    pub fn seeded<I>(seed: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = NewComponent>,
    {
        let now = now_millis();
        let mut state = Self::new();
        for spec in seed {
            let component = Component::create(spec, now)?;
            state.ensure_finite_total(&component)?;
            state.components.insert(component.id.clone(), component);
        }
        state.refresh_total_size();
        Ok(state)
    }

    /// Assemble a state from parts read back from an external document.
    ///
    /// `total_size` is always recomputed from the components.
    pub fn from_parts(
        components: Vec<Component>,
        change_log: ChangeLog,
        is_locked: bool,
        backup_count: u64,
    ) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for component in components {
            component.validate()?;
            if map.contains_key(&component.id) {
                return Err(RegistryError::AlreadyExists(component.id));
            }
            map.insert(component.id.clone(), component);
        }

        let mut state = Self {
            components: map,
            change_log,
            is_locked,
            backup_count,
            total_size: 0.0,
        };
        state.refresh_total_size();
        if !state.total_size.is_finite() {
            return Err(total_overflow());
        }
        Ok(state)
    }

    // Reads

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Components ordered by id.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn backup_count(&self) -> u64 {
        self.backup_count
    }

    pub fn total_size(&self) -> f64 {
        self.total_size
    }

    /// Sum of component sizes in id order.
    pub fn computed_total_size(&self) -> f64 {
        self.components.values().map(|c| c.size).sum()
    }

    // Mutations

    /// Register a new component.
    pub fn add_component(&mut self, spec: NewComponent) -> Result<Component, RegistryError> {
        debug!(name = %spec.name, kind = %spec.kind, "adding component");
        self.ensure_unlocked()?;

        let now = now_millis();
        let component = Component::create(spec, now)?;
        self.ensure_finite_total(&component)?;
        let description = format!("Added {} '{}'", component.kind, component.name);
        self.change_log.append(
            PendingChange::new(ChangeKind::Added, &component, description),
            now,
        );
        self.components.insert(component.id.clone(), component.clone());
        self.refresh_total_size();

        info!(id = %component.id, name = %component.name, size = component.size, "component added");
        Ok(component)
    }

    /// Delete a component, keeping a copy in the log so it can be restored.
    pub fn remove_component(&mut self, id: &ComponentId) -> Result<Component, RegistryError> {
        debug!(id = %id, "removing component");
        self.ensure_unlocked()?;

        let Some(component) = self.components.remove(id) else {
            warn!(id = %id, "remove of unknown component");
            return Err(RegistryError::NotFound(id.clone()));
        };
        self.refresh_total_size();

        let description = format!("Removed {} '{}'", component.kind, component.name);
        self.change_log.append(
            PendingChange::new(ChangeKind::Removed, &component, description)
                .with_payload(component.clone()),
            now_millis(),
        );

        info!(id = %id, name = %component.name, "component removed");
        Ok(component)
    }

    /// Merge `patch` into an existing component.
    pub fn update_component(
        &mut self,
        id: &ComponentId,
        patch: ComponentPatch,
    ) -> Result<Component, RegistryError> {
        debug!(id = %id, "updating component");
        self.ensure_unlocked()?;
        patch.validate()?;

        let now = now_millis();
        let Some(mut updated) = self.components.get(id).cloned() else {
            warn!(id = %id, "update of unknown component");
            return Err(RegistryError::NotFound(id.clone()));
        };
        let touched = updated.apply(patch);
        updated.updated_at = now;
        self.ensure_finite_total(&updated)?;
        self.components.insert(id.clone(), updated.clone());

        let description = if touched.is_empty() {
            format!("Touched '{}'", updated.name)
        } else {
            format!("Updated {} of '{}'", touched.join(", "), updated.name)
        };
        self.change_log.append(
            PendingChange::new(ChangeKind::Modified, &updated, description),
            now,
        );
        self.refresh_total_size();

        info!(id = %id, fields = ?touched, "component updated");
        Ok(updated)
    }

    /// Flip `active` to `inactive`; any other status becomes `active`.
    pub fn toggle_status(&mut self, id: &ComponentId) -> Result<Component, RegistryError> {
        self.ensure_unlocked()?;
        let current = self
            .components
            .get(id)
            .map(|c| c.status)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.update_component(id, ComponentPatch::status(current.toggled()))
    }

    /// Give a component a new display name, recorded as a rename.
    pub fn rename_component(
        &mut self,
        id: &ComponentId,
        name: impl Into<String>,
    ) -> Result<Component, RegistryError> {
        let name = name.into();
        debug!(id = %id, name = %name, "renaming component");
        self.ensure_unlocked()?;
        validate_name(&name)?;

        let now = now_millis();
        let Some(component) = self.components.get_mut(id) else {
            warn!(id = %id, "rename of unknown component");
            return Err(RegistryError::NotFound(id.clone()));
        };
        let previous = std::mem::replace(&mut component.name, name);
        component.updated_at = now;
        let renamed = component.clone();

        let description = format!("Renamed '{}' to '{}'", previous, renamed.name);
        self.change_log.append(
            PendingChange::new(ChangeKind::Renamed, &renamed, description),
            now,
        );

        info!(id = %id, from = %previous, to = %renamed.name, "component renamed");
        Ok(renamed)
    }

    /// Block every component mutation until [`unlock`](Self::unlock).
    pub fn lock(&mut self) {
        self.is_locked = true;
        info!("registry locked");
    }

    pub fn unlock(&mut self) {
        self.is_locked = false;
        info!("registry unlocked");
    }

    pub(crate) fn ensure_unlocked(&self) -> Result<(), RegistryError> {
        if self.is_locked {
            warn!("mutation rejected: registry is locked");
            return Err(RegistryError::Locked);
        }
        Ok(())
    }

    /// Re-insert a component exactly as it was and log the restoration.
    pub(crate) fn restore_component(
        &mut self,
        component: Component,
        description: String,
    ) -> Result<Component, RegistryError> {
        if self.components.contains_key(&component.id) {
            return Err(RegistryError::AlreadyExists(component.id));
        }
        self.ensure_finite_total(&component)?;
        self.change_log.append(
            PendingChange::new(ChangeKind::Added, &component, description),
            now_millis(),
        );
        self.components.insert(component.id.clone(), component.clone());
        self.refresh_total_size();
        Ok(component)
    }

    pub(crate) fn record_backup(&mut self) -> u64 {
        self.backup_count += 1;
        self.backup_count
    }

    fn refresh_total_size(&mut self) {
        self.total_size = self.computed_total_size();
    }

    /// Reject `candidate` (new, or replacing the component with its id) when
    /// the resulting total would overflow. Sums in id order, the same order
    /// [`computed_total_size`](Self::computed_total_size) uses.
    fn ensure_finite_total(&self, candidate: &Component) -> Result<(), RegistryError> {
        let mut total = 0.0_f64;
        let mut pending = Some(candidate);
        for component in self.components.values() {
            if let Some(next) = pending.filter(|c| c.id <= component.id) {
                total += next.size;
                pending = None;
                if next.id == component.id {
                    continue;
                }
            }
            total += component.size;
        }
        if let Some(last) = pending {
            total += last.size;
        }

        if total.is_finite() {
            Ok(())
        } else {
            warn!(id = %candidate.id, size = candidate.size, "total size would overflow");
            Err(total_overflow())
        }
    }

    /// Latest timestamp anywhere in the state, for diagnostics.
    pub fn last_activity(&self) -> Option<Timestamp> {
        let component_max = self.components.values().map(|c| c.updated_at).max();
        let log_max = self.change_log.latest().map(|r| r.timestamp);
        component_max.max(log_max)
    }
}

fn total_overflow() -> RegistryError {
    RegistryError::InvalidComponent("total registry size would not be a finite number".to_string())
}
