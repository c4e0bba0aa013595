//! Server configuration parsing.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::registry::{NewComponent, RollbackPolicy};

/// Server configuration loaded from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Snapshot storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Registry behaviour and seed data.
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Server bind settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1" or "0.0.0.0").
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "component_registry=debug,tower_http=info".
    pub level: String,
    pub format: LogFormat,
    /// "stdout", "stderr", or a file path to append to.
    pub output: String,
    /// ANSI colors (only applied when writing to a terminal).
    pub color: bool,
    pub timestamps: bool,
    /// Include the event target (module path).
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            color: true,
            timestamps: true,
            target: true,
        }
    }
}

/// Where backups live and how long snapshot I/O may take.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the fjall snapshot store directory.
    pub path: String,
    /// Upper bound for backup, restore, export, and import calls.
    pub snapshot_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: ".component-registry".to_string(),
            snapshot_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }
}

/// Registry settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Make rollback fail while the registry is locked.
    pub rollback_respects_lock: bool,
    /// Components present when the server starts.
    pub seed: Vec<NewComponent>,
}

impl RegistryConfig {
    pub fn rollback_policy(&self) -> RollbackPolicy {
        RollbackPolicy::from_respect_lock(self.rollback_respects_lock)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Get the socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
