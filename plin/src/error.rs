//! Error types for controller operations.
//!
//! Only [`ControllerError::Transport`] ever reaches a page: storage problems
//! during request handling are logged and treated as misses. Backend errors
//! surface only from lifecycle operations.

use plin_backend::BackendError;
use plin_core::TransportError;
use thiserror::Error;

/// Errors produced by [`CacheController`](crate::CacheController) operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The network failed and nothing stored could stand in for it.
    #[error("network request failed: {0}")]
    Transport(#[from] TransportError),

    /// The storage backend failed during a lifecycle operation.
    #[error("cache storage failed: {0}")]
    Backend(#[from] BackendError),

    /// A concurrent network fetch was cancelled or panicked.
    #[error("in-flight request interrupted: {0}")]
    Interrupted(String),
}
