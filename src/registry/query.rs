//! Read-side helpers: component filtering and registry statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::RegistryState;
use super::types::{Component, ComponentKind, ComponentStatus};

/// Filter for listing components. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentFilter {
    /// Case-insensitive text matched against name, description, and tags.
    pub search: Option<String>,
    pub kind: Option<ComponentKind>,
    pub status: Option<ComponentStatus>,
}

impl ComponentFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: ComponentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, component: &Component) -> bool {
        if self.kind.is_some_and(|k| k != component.kind) {
            return false;
        }
        if self.status.is_some_and(|s| s != component.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(text) => {
                let needle = text.to_lowercase();
                component.name.to_lowercase().contains(&needle)
                    || component.description.to_lowercase().contains(&needle)
                    || component
                        .tags
                        .iter()
                        .any(|t| t.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Summary numbers for a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub component_count: usize,
    pub active_count: usize,
    pub by_kind: BTreeMap<ComponentKind, usize>,
    pub total_size: f64,
    pub change_count: usize,
    pub backup_count: u64,
    pub is_locked: bool,
}

impl RegistryState {
    /// Components matching `filter`, ordered by id.
    pub fn query(&self, filter: &ComponentFilter) -> Vec<Component> {
        self.components()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_kind = BTreeMap::new();
        for component in self.components() {
            *by_kind.entry(component.kind).or_insert(0) += 1;
        }
        RegistryStats {
            component_count: self.len(),
            active_count: self
                .components()
                .filter(|c| c.status == ComponentStatus::Active)
                .count(),
            by_kind,
            total_size: self.total_size(),
            change_count: self.change_log().len(),
            backup_count: self.backup_count(),
            is_locked: self.is_locked(),
        }
    }
}
