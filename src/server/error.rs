//! API error types and JSON response formatting.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::registry::RegistryError;
use crate::snapshot::SnapshotError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details in the response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Malformed path parameter or request body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// A snapshot operation ran past the configured deadline.
    pub fn snapshot_timeout(operation: &str, timeout_ms: u64) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            "SNAPSHOT_TIMEOUT",
            format!("{} did not finish within {} ms", operation, timeout_ms),
        )
        .with_details(serde_json::json!({ "operation": operation, "timeoutMs": timeout_ms }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let status = match &err {
            RegistryError::Locked => StatusCode::LOCKED,
            RegistryError::NotFound(_) | RegistryError::ChangeNotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::NotReversible(_) | RegistryError::AlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            RegistryError::InvalidComponent(_) => StatusCode::BAD_REQUEST,
        };
        let details = match &err {
            RegistryError::NotFound(id) | RegistryError::AlreadyExists(id) => {
                Some(serde_json::json!({ "id": id }))
            }
            RegistryError::ChangeNotFound(change) | RegistryError::NotReversible(change) => {
                Some(serde_json::json!({ "changeId": change }))
            }
            RegistryError::Locked | RegistryError::InvalidComponent(_) => None,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        let status = match &err {
            SnapshotError::BackupNotFound(_) => StatusCode::NOT_FOUND,
            SnapshotError::CorruptBackup { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SnapshotError::Import(_) | SnapshotError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let details = match &err {
            SnapshotError::BackupNotFound(key) | SnapshotError::CorruptBackup { key, .. } => {
                Some(serde_json::json!({ "key": key }))
            }
            _ => None,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}
