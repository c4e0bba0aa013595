//! API routes and handlers.

mod changes;
mod components;
mod snapshots;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::registry::RegistryStats;

use super::state::AppState;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Components
        .route(
            "/components",
            get(components::list_components).post(components::add_component),
        )
        .route(
            "/components/{id}",
            get(components::get_component)
                .patch(components::update_component)
                .delete(components::remove_component),
        )
        .route("/components/{id}/toggle", post(components::toggle_status))
        .route("/components/{id}/rename", post(components::rename_component))
        .route("/bulk", post(components::bulk_action))
        // Change log
        .route("/changes", get(changes::list_changes))
        .route("/changes/{id}", get(changes::get_change))
        .route("/changes/{id}/rollback", post(changes::rollback))
        // Lock
        .route("/lock", post(lock))
        .route("/unlock", post(unlock))
        .route("/stats", get(stats))
        // Snapshots
        .route(
            "/backups",
            get(snapshots::list_backups).post(snapshots::create_backup),
        )
        .route("/backups/restore", post(snapshots::restore_backup))
        .route("/export", get(snapshots::export_project))
        .route("/import", post(snapshots::import_project));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockState {
    pub is_locked: bool,
}

pub async fn lock(State(state): State<AppState>) -> Json<LockState> {
    state.registry().lock();
    Json(LockState { is_locked: true })
}

pub async fn unlock(State(state): State<AppState>) -> Json<LockState> {
    state.registry().unlock();
    Json(LockState { is_locked: false })
}

pub async fn stats(State(state): State<AppState>) -> Json<RegistryStats> {
    Json(state.registry().stats())
}
