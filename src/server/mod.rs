//! HTTP API server for the component registry.
//!
//! This module exposes the registry and its snapshot service over a JSON
//! API built on axum. Registry errors map onto HTTP statuses (a locked
//! registry answers `423 Locked`), and snapshot I/O is bounded by a
//! configurable timeout.

mod config;
mod error;
mod logging;
mod routes;
mod state;

pub use config::{
    Config, ConfigError, LogFormat, LoggingConfig, RegistryConfig, ServerConfig, StorageConfig,
};
pub use error::{ApiError, ErrorBody, ErrorResponse};
pub use logging::{LoggingError, init as init_logging};
pub use routes::router;
pub use state::{AppState, StateError};
