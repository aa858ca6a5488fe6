use bincode::error::{DecodeError, EncodeError};
use feoxdb::FeoxError;
use plin_backend::BackendError;
use thiserror::Error;

/// Errors that can occur when using [`FeOxDbBackend`](crate::FeOxDbBackend).
#[derive(Debug, Error)]
pub enum FeOxDbError {
    /// An error from the underlying FeOxDB store.
    #[error("FeOxDB error: {0}")]
    FeOxDb(#[from] FeoxError),

    /// Failed to encode the generation index.
    #[error("index encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// The generation index on disk could not be decoded.
    #[error("index decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// The blocking worker running a store operation was lost.
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<FeOxDbError> for BackendError {
    fn from(error: FeOxDbError) -> Self {
        match error {
            FeOxDbError::FeOxDb(error) => BackendError::ConnectionError(Box::new(error)),
            other => BackendError::InternalError(Box::new(other)),
        }
    }
}
