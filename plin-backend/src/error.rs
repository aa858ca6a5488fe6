//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur during storage backend
/// interactions into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to I/O with the underlying store.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Error talking to the underlying store (disk, remote service).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Quota exceeded or the store refused the write.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}
