//! Data types for the registry module.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RegistryError;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current wall-clock time as a [`Timestamp`].
pub fn now_millis() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Opaque, immutable component identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What sort of artifact a component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ComponentKind {
    #[default]
    Component,
    Page,
    Feature,
    Style,
    Asset,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Component,
        ComponentKind::Page,
        ComponentKind::Feature,
        ComponentKind::Style,
        ComponentKind::Asset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Component => "component",
            ComponentKind::Page => "page",
            ComponentKind::Feature => "feature",
            ComponentKind::Style => "style",
            ComponentKind::Asset => "asset",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ComponentStatus {
    #[default]
    Active,
    Inactive,
    Draft,
    Deprecated,
}

impl ComponentStatus {
    /// The status a toggle moves to: `active` goes `inactive`, everything
    /// else goes `active`.
    pub fn toggled(self) -> Self {
        match self {
            ComponentStatus::Active => ComponentStatus::Inactive,
            _ => ComponentStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Active => "active",
            ComponentStatus::Inactive => "inactive",
            ComponentStatus::Draft => "draft",
            ComponentStatus::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A registered artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    pub status: ComponentStatus,
    /// Informational only; ids here are not required to exist.
    #[serde(default)]
    pub dependencies: BTreeSet<ComponentId>,
    #[serde(default)]
    pub description: String,
    /// Non-negative weight (kilobytes by convention).
    pub size: f64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Component {
    /// Build a component from a creation request with a fresh id.
    pub fn create(spec: NewComponent, now: Timestamp) -> Result<Self, RegistryError> {
        validate_name(&spec.name)?;
        validate_size(spec.size)?;

        Ok(Self {
            id: ComponentId::generate(),
            name: spec.name,
            kind: spec.kind,
            status: spec.status,
            dependencies: spec.dependencies,
            description: spec.description,
            size: spec.size,
            version: spec.version,
            tags: spec.tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check the field constraints a stored component must satisfy.
    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_name(&self.name)?;
        validate_size(self.size)
    }

    /// Merge a patch into this component, returning the names of the fields
    /// that were present in the patch.
    pub(crate) fn apply(&mut self, patch: ComponentPatch) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if let Some(name) = patch.name {
            self.name = name;
            touched.push("name");
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
            touched.push("kind");
        }
        if let Some(status) = patch.status {
            self.status = status;
            touched.push("status");
        }
        if let Some(dependencies) = patch.dependencies {
            self.dependencies = dependencies;
            touched.push("dependencies");
        }
        if let Some(description) = patch.description {
            self.description = description;
            touched.push("description");
        }
        if let Some(size) = patch.size {
            self.size = size;
            touched.push("size");
        }
        if let Some(version) = patch.version {
            self.version = version;
            touched.push("version");
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
            touched.push("tags");
        }
        touched
    }
}

/// Request to create a component. The registry assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    pub name: String,
    #[serde(default)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub status: ComponentStatus,
    #[serde(default)]
    pub dependencies: BTreeSet<ComponentId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl NewComponent {
    /// A minimal active component of the given kind.
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            status: ComponentStatus::Active,
            dependencies: BTreeSet::new(),
            description: String::new(),
            size: 0.0,
            version: default_version(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_status(mut self, status: ComponentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies<I>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = ComponentId>,
    {
        self.dependencies = dependencies.into_iter().collect();
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub kind: Option<ComponentKind>,
    pub status: Option<ComponentStatus>,
    pub dependencies: Option<BTreeSet<ComponentId>>,
    pub description: Option<String>,
    pub size: Option<f64>,
    pub version: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl ComponentPatch {
    pub fn status(status: ComponentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn size(size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Reject patches that would leave the component invalid.
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(size) = self.size {
            validate_size(size)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::InvalidComponent(
            "component name must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_size(size: f64) -> Result<(), RegistryError> {
    if !size.is_finite() || size < 0.0 {
        return Err(RegistryError::InvalidComponent(format!(
            "component size must be a non-negative number, got {}",
            size
        )));
    }
    Ok(())
}
