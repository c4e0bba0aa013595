//! Conditional logging macros for library-level tracing.
//!
//! With the `logging` feature these forward to `tracing`; without it they
//! expand to nothing, so the registry carries no logging cost for embedders
//! that do not want it.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::logging::{info, warn};
//!
//! info!(id = %component.id, size = component.size, "component added");
//! warn!(change = %change_id, "change is not reversible");
//! ```

/// Low-level detail (blob sizes, version checks).
#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

/// Entry into an operation, before any checks run.
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Accepted mutations and lifecycle events (backup, restore, import).
#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// Rejected operations: locked registry, unknown ids, irreversible changes.
#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Unreadable or corrupt external data, failed storage writes.
#[cfg(feature = "logging")]
macro_rules! log_error {
    ($($arg:tt)*) => { tracing::error!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use log_debug as debug;
#[allow(unused_imports)]
pub(crate) use log_error as error;
#[allow(unused_imports)]
pub(crate) use log_info as info;
#[allow(unused_imports)]
pub(crate) use log_trace as trace;
#[allow(unused_imports)]
pub(crate) use log_warn as warn;
