//! Common test utilities and fixtures.

#![cfg(feature = "server")]

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

use component_registry::server::{
    AppState, Config, LoggingConfig, RegistryConfig, ServerConfig, StorageConfig, router,
};
use component_registry::{MemorySnapshotStore, Registry, RollbackPolicy};

// =============================================================================
// Test Application
// =============================================================================

/// Test application wrapper around an in-memory snapshot store.
pub struct TestApp {
    pub server: TestServer,
}

impl TestApp {
    /// Fresh empty registry with the default rollback policy.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_registry(Registry::new())
    }

    pub fn with_policy(policy: RollbackPolicy) -> anyhow::Result<Self> {
        Self::with_registry(Registry::new().with_rollback_policy(policy))
    }

    fn with_registry(registry: Registry) -> anyhow::Result<Self> {
        let state = AppState::new(
            registry,
            Arc::new(MemorySnapshotStore::new()),
            Duration::from_secs(5),
        );
        let server = TestServer::new(router(state))?;
        Ok(Self { server })
    }

    /// Add a component and return its JSON representation.
    pub async fn add(&self, name: &str, kind: &str, size: f64) -> anyhow::Result<Value> {
        let response = self
            .server
            .post("/api/v1/components")
            .json(&json!({ "name": name, "kind": kind, "size": size }))
            .await;
        response.assert_status(StatusCode::CREATED);
        Ok(response.json())
    }

    /// Add a component and return only its id.
    pub async fn add_id(&self, name: &str, kind: &str, size: f64) -> anyhow::Result<String> {
        let body = self.add(name, kind, size).await?;
        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing id in {}", body))
    }

    /// Newest change record as JSON.
    pub async fn latest_change(&self) -> Value {
        let changes: Vec<Value> = self.server.get("/api/v1/changes").await.json();
        changes.into_iter().next().unwrap_or(Value::Null)
    }
}

/// Test application backed by a real fjall store in a temporary directory.
pub struct PersistentTestApp {
    pub server: TestServer,
    _temp_dir: TempDir, // Keep alive for test duration
}

impl PersistentTestApp {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let store_path = temp_dir.path().join("store");
        let config = Config {
            server: ServerConfig {
                bind: "127.0.0.1".into(),
                port: 0,
            },
            logging: LoggingConfig::default(),
            storage: StorageConfig {
                path: store_path.to_string_lossy().into(),
                snapshot_timeout_ms: 5000,
            },
            registry: RegistryConfig::default(),
        };
        let state = AppState::from_config(&config)?;
        let server = TestServer::new(router(state))?;
        Ok(Self {
            server,
            _temp_dir: temp_dir,
        })
    }
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert a JSON error body carries the expected code.
pub fn assert_error_code(body: &Value, code: &str) {
    assert_eq!(
        body["error"]["code"].as_str(),
        Some(code),
        "unexpected error body: {}",
        body
    );
}
