//! Lifecycle state and the reports install and activation produce.

use http::StatusCode;
use plin_backend::BackendError;
use plin_core::{GenerationName, TransportError};
use thiserror::Error;
use url::Url;

/// Where the controller is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WorkerState {
    /// Constructed, no lifecycle event handled yet.
    Parsed = 0,
    /// Populating the current generation.
    Installing = 1,
    /// The current generation is populated.
    Installed = 2,
    /// Deleting stale generations.
    Activating = 3,
    /// Serving with the current generation.
    Activated = 4,
}

impl WorkerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Parsed,
            1 => WorkerState::Installing,
            2 => WorkerState::Installed,
            3 => WorkerState::Activating,
            _ => WorkerState::Activated,
        }
    }

    /// Returns the state as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        }
    }
}

/// Why a single manifest asset was not stored during install.
#[derive(Debug, Error)]
pub enum PrecacheError {
    /// The asset could not be fetched.
    #[error("fetch failed: {0}")]
    Transport(#[from] TransportError),

    /// The asset answered with something other than 200.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// The asset was fetched but could not be written.
    #[error("write failed: {0}")]
    Backend(#[from] BackendError),
}

/// A manifest asset that install could not store.
#[derive(Debug)]
pub struct PrecacheFailure {
    /// The asset URL.
    pub url: Url,
    /// What went wrong.
    pub error: PrecacheError,
}

/// Outcome of [`CacheController::install`](crate::CacheController::install).
#[derive(Debug)]
pub struct InstallReport {
    /// The generation that was populated.
    pub generation: GenerationName,
    /// Assets stored, in manifest order.
    pub stored: Vec<Url>,
    /// Assets that failed, in manifest order.
    pub failed: Vec<PrecacheFailure>,
}

impl InstallReport {
    /// Whether every manifest asset was stored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`CacheController::activate`](crate::CacheController::activate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// The generation now in use.
    pub current: GenerationName,
    /// Stale generations that were deleted.
    pub deleted: Vec<GenerationName>,
}
