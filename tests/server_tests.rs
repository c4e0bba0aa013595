//! Integration tests for the component-registry HTTP API server.
//!
//! These tests use axum-test to make requests against the router without starting a real server.

#![cfg(feature = "server")]

mod common;

use axum::http::StatusCode;
use common::{PersistentTestApp, TestApp, assert_error_code};
use component_registry::RollbackPolicy;
use serde_json::{Value, json};

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");

    Ok(())
}

// =============================================================================
// Component Tests
// =============================================================================

#[tokio::test]
async fn test_add_and_get_component() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let created = app.add("Navbar", "component", 12.5).await?;
    assert_eq!(created["name"], "Navbar");
    assert_eq!(created["status"], "active");
    assert_eq!(created["version"], "1.0.0");
    let id = created["id"].as_str().unwrap_or_default();

    let response = app.server.get(&format!("/api/v1/components/{}", id)).await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched, created);

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats["componentCount"], 1);
    assert_eq!(stats["totalSize"], 12.5);

    Ok(())
}

#[tokio::test]
async fn test_unknown_component_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/api/v1/components/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_code(&response.json(), "COMPONENT_NOT_FOUND");

    let response = app.server.delete("/api/v1/components/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_invalid_component_is_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/components")
        .json(&json!({ "name": "  ", "kind": "page" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response.json(), "INVALID_COMPONENT");

    Ok(())
}

#[tokio::test]
async fn test_update_toggle_and_rename() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.add_id("Card", "component", 2.0).await?;

    let response = app
        .server
        .patch(&format!("/api/v1/components/{}", id))
        .json(&json!({ "size": 5.0, "description": "A card" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["size"], 5.0);
    assert_eq!(updated["description"], "A card");

    let toggled: Value = app
        .server
        .post(&format!("/api/v1/components/{}/toggle", id))
        .await
        .json();
    assert_eq!(toggled["status"], "inactive");

    let renamed: Value = app
        .server
        .post(&format!("/api/v1/components/{}/rename", id))
        .json(&json!({ "name": "Tile" }))
        .await
        .json();
    assert_eq!(renamed["name"], "Tile");

    let latest = app.latest_change().await;
    assert_eq!(latest["kind"], "renamed");

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats["totalSize"], 5.0);
    assert_eq!(stats["changeCount"], 4);

    Ok(())
}

#[tokio::test]
async fn test_list_components_with_filters() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add("Navbar", "component", 1.0).await?;
    app.add("Landing", "page", 2.0).await?;
    let footer = app.add_id("Footer", "component", 3.0).await?;
    app.server
        .post(&format!("/api/v1/components/{}/toggle", footer))
        .await
        .assert_status_ok();

    let all: Vec<Value> = app.server.get("/api/v1/components").await.json();
    assert_eq!(all.len(), 3);

    let components: Vec<Value> = app
        .server
        .get("/api/v1/components")
        .add_query_param("kind", "component")
        .await
        .json();
    assert_eq!(components.len(), 2);

    let active_components: Vec<Value> = app
        .server
        .get("/api/v1/components")
        .add_query_param("kind", "component")
        .add_query_param("status", "active")
        .await
        .json();
    assert_eq!(active_components.len(), 1);
    assert_eq!(active_components[0]["name"], "Navbar");

    let search: Vec<Value> = app
        .server
        .get("/api/v1/components")
        .add_query_param("search", "LAND")
        .await
        .json();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0]["kind"], "page");

    Ok(())
}

// =============================================================================
// Lock Tests
// =============================================================================

#[tokio::test]
async fn test_locked_registry_rejects_mutations() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.add_id("Navbar", "component", 12.5).await?;

    let body: Value = app.server.post("/api/v1/lock").await.json();
    assert_eq!(body["isLocked"], true);

    let response = app
        .server
        .post("/api/v1/components")
        .json(&json!({ "name": "Footer", "kind": "component", "size": 1.0 }))
        .await;
    response.assert_status(StatusCode::LOCKED);
    assert_error_code(&response.json(), "LOCKED");

    app.server
        .delete(&format!("/api/v1/components/{}", id))
        .await
        .assert_status(StatusCode::LOCKED);

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats["totalSize"], 12.5);
    assert_eq!(stats["isLocked"], true);

    app.server.post("/api/v1/unlock").await.assert_status_ok();
    app.server
        .delete(&format!("/api/v1/components/{}", id))
        .await
        .assert_status_ok();

    Ok(())
}

// =============================================================================
// Change Log and Rollback Tests
// =============================================================================

#[tokio::test]
async fn test_remove_then_rollback() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let original = app.add("Navbar", "component", 12.5).await?;
    let id = original["id"].as_str().unwrap_or_default();

    let removed: Value = app
        .server
        .delete(&format!("/api/v1/components/{}", id))
        .await
        .json();
    assert_eq!(removed, original);

    let removal = app.latest_change().await;
    assert_eq!(removal["kind"], "removed");
    assert_eq!(removal["rollbackPayload"], original);
    let change_id = removal["id"].as_u64().unwrap_or_default();

    let response = app
        .server
        .get(&format!("/api/v1/changes/{}", change_id))
        .await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched, removal);

    let response = app
        .server
        .post(&format!("/api/v1/changes/{}/rollback", change_id))
        .await;
    response.assert_status_ok();
    let restored: Value = response.json();
    assert_eq!(restored, original);

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats["totalSize"], 12.5);
    assert_eq!(stats["componentCount"], 1);

    Ok(())
}

#[tokio::test]
async fn test_rollback_errors() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add("Navbar", "component", 1.0).await?;
    let added = app.latest_change().await;
    let added_id = added["id"].as_u64().unwrap_or_default();

    let response = app
        .server
        .post(&format!("/api/v1/changes/{}/rollback", added_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_error_code(&response.json(), "NOT_REVERSIBLE");

    let response = app.server.post("/api/v1/changes/999/rollback").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_code(&response.json(), "CHANGE_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_rollback_respects_lock_when_configured() -> anyhow::Result<()> {
    let app = TestApp::with_policy(RollbackPolicy::RespectLock)?;
    let id = app.add_id("Navbar", "component", 1.0).await?;
    app.server
        .delete(&format!("/api/v1/components/{}", id))
        .await
        .assert_status_ok();
    let change_id = app.latest_change().await["id"].as_u64().unwrap_or_default();

    app.server.post("/api/v1/lock").await.assert_status_ok();
    app.server
        .post(&format!("/api/v1/changes/{}/rollback", change_id))
        .await
        .assert_status(StatusCode::LOCKED);

    Ok(())
}

// =============================================================================
// Bulk Tests
// =============================================================================

#[tokio::test]
async fn test_bulk_deactivate_reports_missing_items() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let a = app.add_id("A", "asset", 1.0).await?;
    let c = app.add_id("C", "asset", 1.0).await?;

    let response = app
        .server
        .post("/api/v1/bulk")
        .json(&json!({ "ids": [a, "missing", c], "action": "deactivate" }))
        .await;
    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["applied"], json!([a, c]));
    assert_eq!(
        report["skipped"],
        json!([{ "id": "missing", "reason": { "code": "NOT_FOUND" } }])
    );

    let inactive: Vec<Value> = app
        .server
        .get("/api/v1/components")
        .add_query_param("status", "inactive")
        .await
        .json();
    assert_eq!(inactive.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_bulk_remove_when_locked_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let a = app.add_id("A", "asset", 1.0).await?;
    app.server.post("/api/v1/lock").await.assert_status_ok();

    let response = app
        .server
        .post("/api/v1/bulk")
        .json(&json!({ "ids": [a], "action": "remove" }))
        .await;
    response.assert_status(StatusCode::LOCKED);

    Ok(())
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[tokio::test]
async fn test_backup_and_restore() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add("Navbar", "component", 12.5).await?;

    let response = app.server.post("/api/v1/backups").await;
    response.assert_status(StatusCode::CREATED);
    let backup: Value = response.json();
    assert_eq!(backup["backupCount"], 1);
    let key = backup["key"].as_str().unwrap_or_default().to_string();

    let listed: Value = app.server.get("/api/v1/backups").await.json();
    assert_eq!(listed["backups"], json!([key]));

    app.add("Footer", "component", 2.0).await?;

    let response = app
        .server
        .post("/api/v1/backups/restore")
        .json(&json!({ "key": key }))
        .await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["componentCount"], 1);
    assert_eq!(stats["totalSize"], 12.5);
    assert_eq!(stats["backupCount"], 1);

    Ok(())
}

#[tokio::test]
async fn test_restore_missing_backup() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/backups/restore")
        .json(&json!({ "key": "backup/none" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_code(&response.json(), "BACKUP_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_export_import_round_trip() -> anyhow::Result<()> {
    let source = TestApp::new()?;
    let id = source.add_id("Navbar", "component", 12.5).await?;
    source.add("Theme", "style", 0.5).await?;
    source
        .server
        .delete(&format!("/api/v1/components/{}", id))
        .await
        .assert_status_ok();
    source.server.post("/api/v1/lock").await.assert_status_ok();

    let response = source.server.get("/api/v1/export").await;
    response.assert_status_ok();
    let exported: Value = response.json();
    assert_eq!(exported["formatVersion"], "1.0.0");
    assert_eq!(exported["isLocked"], true);
    assert_eq!(exported["changeLog"].as_array().map(Vec::len), Some(3));

    let target = TestApp::new()?;
    let response = target
        .server
        .post("/api/v1/import")
        .text(exported.to_string())
        .await;
    response.assert_status_ok();

    let source_stats: Value = source.server.get("/api/v1/stats").await.json();
    let target_stats: Value = target.server.get("/api/v1/stats").await.json();
    assert_eq!(source_stats, target_stats);

    let source_changes: Value = source.server.get("/api/v1/changes").await.json();
    let target_changes: Value = target.server.get("/api/v1/changes").await.json();
    assert_eq!(source_changes, target_changes);

    Ok(())
}

#[tokio::test]
async fn test_import_rejects_malformed_document() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add("Navbar", "component", 1.0).await?;

    let response = app
        .server
        .post("/api/v1/import")
        .text(r#"{"components": []}"#)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response.json(), "IMPORT_ERROR");

    let stats: Value = app.server.get("/api/v1/stats").await.json();
    assert_eq!(stats["componentCount"], 1);

    Ok(())
}

#[tokio::test]
async fn test_backups_persist_in_fjall_store() -> anyhow::Result<()> {
    let app = PersistentTestApp::new()?;

    app.server
        .post("/api/v1/components")
        .json(&json!({ "name": "Navbar", "kind": "component", "size": 3.0 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.post("/api/v1/backups").await;
    response.assert_status(StatusCode::CREATED);
    let backup: Value = response.json();

    let listed: Value = app.server.get("/api/v1/backups").await.json();
    assert_eq!(listed["backups"], json!([backup["key"]]));

    Ok(())
}
