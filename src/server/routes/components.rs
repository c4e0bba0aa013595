//! Component CRUD, status toggling, renaming, and bulk handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::registry::{
    BulkAction, BulkReport, Component, ComponentFilter, ComponentId, ComponentPatch, NewComponent,
    RegistryError,
};
use crate::server::{error::ApiError, state::AppState};

/// List components, optionally filtered by `search`, `kind`, and `status`.
pub async fn list_components(
    State(state): State<AppState>,
    Query(filter): Query<ComponentFilter>,
) -> Json<Vec<Component>> {
    Json(state.registry().components(&filter))
}

pub async fn add_component(
    State(state): State<AppState>,
    Json(spec): Json<NewComponent>,
) -> Result<(StatusCode, Json<Component>), ApiError> {
    let component = state.registry().add_component(spec)?;
    Ok((StatusCode::CREATED, Json(component)))
}

pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Component>, ApiError> {
    let id = ComponentId::from(id);
    state
        .registry()
        .component(&id)
        .map(Json)
        .ok_or_else(|| RegistryError::NotFound(id).into())
}

pub async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ComponentPatch>,
) -> Result<Json<Component>, ApiError> {
    let component = state
        .registry()
        .update_component(&ComponentId::from(id), patch)?;
    Ok(Json(component))
}

/// Remove a component; the response carries the removed component.
pub async fn remove_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Component>, ApiError> {
    let removed = state.registry().remove_component(&ComponentId::from(id))?;
    Ok(Json(removed))
}

pub async fn toggle_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Component>, ApiError> {
    let component = state.registry().toggle_status(&ComponentId::from(id))?;
    Ok(Json(component))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

pub async fn rename_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Component>, ApiError> {
    let component = state
        .registry()
        .rename_component(&ComponentId::from(id), request.name)?;
    Ok(Json(component))
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<ComponentId>,
    pub action: BulkAction,
}

/// Apply one action to many components. Per-item failures are reported in
/// the body; only a locked `remove` fails the whole request.
pub async fn bulk_action(
    State(state): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkReport>, ApiError> {
    let report = state.registry().bulk_action(&request.ids, request.action)?;
    Ok(Json(report))
}
