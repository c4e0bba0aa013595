//! Append-only change log.
//!
//! Records are stored in append order. Ids are assigned from a counter that
//! only moves forward, so an id is never reused even across rollbacks.
//! Nothing in this module can modify or drop a record once appended; the
//! only write primitive is [`ChangeLog::append`], and it is crate-private.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{Component, ComponentId, Timestamp};

/// Identifier of a change record, monotonic in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(u64);

impl ChangeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Renamed => "renamed",
        };
        f.pad(s)
    }
}

/// One immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: ChangeId,
    pub kind: ChangeKind,
    pub component_id: ComponentId,
    /// Component name at the time of the change.
    pub component_name: String,
    pub description: String,
    pub timestamp: Timestamp,
    /// Full pre-change component; only removals carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_payload: Option<Component>,
}

impl ChangeRecord {
    pub fn is_reversible(&self) -> bool {
        self.rollback_payload.is_some()
    }
}

/// Fields of a record before the log assigns its id.
#[derive(Debug)]
pub(crate) struct PendingChange {
    pub kind: ChangeKind,
    pub component_id: ComponentId,
    pub component_name: String,
    pub description: String,
    pub rollback_payload: Option<Component>,
}

impl PendingChange {
    pub fn new(kind: ChangeKind, component: &Component, description: impl Into<String>) -> Self {
        Self {
            kind,
            component_id: component.id.clone(),
            component_name: component.name.clone(),
            description: description.into(),
            rollback_payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Component) -> Self {
        self.rollback_payload = Some(payload);
        self
    }
}

/// Ordered, append-only sequence of change records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChangeRecord>", into = "Vec<ChangeRecord>")]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning the next id.
    pub(crate) fn append(&mut self, change: PendingChange, timestamp: Timestamp) -> ChangeId {
        let id = self.next_id();
        self.records.push(ChangeRecord {
            id,
            kind: change.kind,
            component_id: change.component_id,
            component_name: change.component_name,
            description: change.description,
            timestamp,
            rollback_payload: change.rollback_payload,
        });
        id
    }

    /// Id the next appended record will receive.
    pub fn next_id(&self) -> ChangeId {
        ChangeId(self.records.last().map_or(1, |r| r.id.0 + 1))
    }

    pub fn get(&self, id: ChangeId) -> Option<&ChangeRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .and_then(|i| self.records.get(i))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in append order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChangeRecord> + '_ {
        self.records.iter()
    }

    /// Records newest first, the usual display order.
    pub fn newest_first(&self) -> impl Iterator<Item = &ChangeRecord> + '_ {
        self.records.iter().rev()
    }

    pub fn latest(&self) -> Option<&ChangeRecord> {
        self.records.last()
    }

    pub fn as_slice(&self) -> &[ChangeRecord] {
        &self.records
    }
}

/// Error building a log from external records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOrderError {
    pub previous: ChangeId,
    pub found: ChangeId,
}

impl fmt::Display for ChangeOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "change ids must be strictly ascending: {} followed by {}",
            self.previous, self.found
        )
    }
}

impl std::error::Error for ChangeOrderError {}

impl TryFrom<Vec<ChangeRecord>> for ChangeLog {
    type Error = ChangeOrderError;

    fn try_from(records: Vec<ChangeRecord>) -> Result<Self, Self::Error> {
        for pair in records.windows(2) {
            if let [prev, next] = pair {
                if next.id <= prev.id {
                    return Err(ChangeOrderError {
                        previous: prev.id,
                        found: next.id,
                    });
                }
            }
        }
        Ok(Self { records })
    }
}

impl From<ChangeLog> for Vec<ChangeRecord> {
    fn from(log: ChangeLog) -> Self {
        log.records
    }
}
