//! Traits and structs for plin storage backends.
//!
//! A backend is a key-value blob store partitioned into named cache
//! generations. If you want to keep stored entries somewhere other than
//! memory, implement [`Backend`] and the controller will use it unchanged.
mod backend;
mod error;
pub mod format;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{BincodeFormat, Format, FormatError, JsonFormat};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
