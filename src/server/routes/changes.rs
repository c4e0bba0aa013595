//! Change log handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::registry::{ChangeId, ChangeRecord, Component, RegistryError};
use crate::server::{error::ApiError, state::AppState};

/// Change records, newest first.
pub async fn list_changes(State(state): State<AppState>) -> Json<Vec<ChangeRecord>> {
    Json(state.registry().changes())
}

pub async fn get_change(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ChangeRecord>, ApiError> {
    let id = ChangeId::new(id);
    state
        .registry()
        .change(id)
        .map(Json)
        .ok_or_else(|| RegistryError::ChangeNotFound(id).into())
}

/// Restore the component captured by a change record.
pub async fn rollback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Component>, ApiError> {
    let restored = state.registry().rollback(ChangeId::new(id))?;
    Ok(Json(restored))
}
