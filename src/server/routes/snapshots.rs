//! Backup, restore, export, and import handlers.
//!
//! Every handler here goes through [`AppState::run_snapshot`], so store I/O
//! runs off the async workers and is bounded by the snapshot timeout.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::registry::RegistryStats;
use crate::server::{error::ApiError, state::AppState};
use crate::snapshot::{BackupInfo, ExportDocument};

pub async fn create_backup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<BackupInfo>), ApiError> {
    let info = state
        .run_snapshot("backup", |s| s.create_backup())
        .await?;
    Ok((StatusCode::CREATED, Json(info)))
}

#[derive(Debug, Serialize)]
pub struct BackupList {
    pub backups: Vec<String>,
}

pub async fn list_backups(State(state): State<AppState>) -> Result<Json<BackupList>, ApiError> {
    let backups = state
        .run_snapshot("list backups", |s| s.list_backups())
        .await?;
    Ok(Json(BackupList { backups }))
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub key: String,
}

pub async fn restore_backup(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RegistryStats>, ApiError> {
    let stats = state
        .run_snapshot("restore", move |s| s.restore_backup(&request.key))
        .await?;
    Ok(Json(stats))
}

pub async fn export_project(
    State(state): State<AppState>,
) -> Result<Json<ExportDocument>, ApiError> {
    let document = state
        .run_snapshot("export", |s| Ok(s.export_project()))
        .await?;
    Ok(Json(document))
}

/// Replace the registry with an exported document. The body is the raw
/// JSON text so that parse failures surface as `IMPORT_ERROR`.
pub async fn import_project(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RegistryStats>, ApiError> {
    let stats = state
        .run_snapshot("import", move |s| s.import_project(&body))
        .await?;
    Ok(Json(stats))
}
