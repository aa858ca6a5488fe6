#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Controller configuration.
///
/// [`ControllerConfig`] carries the current generation, the scope, the
/// precache manifest and the routing rules. Build one with
/// [`ControllerConfig::builder`] or start from
/// [`ControllerConfig::production`].
pub mod config;

mod controller;

/// Error types for controller operations.
pub mod error;

/// Host-facing event adapter.
///
/// Provides [`LifecycleEvent`], [`Handled`], the per-event
/// [`EventLifetime`] and the [`Host`] capabilities used during install and
/// activation.
pub mod event;

/// Lifecycle state and install/activate reports.
pub mod lifecycle;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// request outcomes, generation writes and deletions, and deferred task
/// accounting.
pub mod metrics;

/// Deferred work tracking.
///
/// Cache writes and background revalidation outlive the response they belong
/// to. The [`OffloadManager`](offload::OffloadManager) spawns and tracks them.
pub mod offload;

/// Request classification: [`Route`], [`ExclusionSet`] and [`ApiPatternSet`].
pub mod rules;

/// Outcome types: [`Served`], [`CacheStatus`] and [`ResponseSource`].
pub mod status;

/// Store admission: which responses may be written to a generation.
pub mod store;

mod strategy;

pub use config::{ConfigError, ControllerConfig, ControllerConfigBuilder};
pub use controller::CacheController;
pub use error::ControllerError;
pub use event::{EventLifetime, EventResponse, Handled, Host, LifecycleEvent, NoopHost};
pub use lifecycle::{ActivateReport, InstallReport, PrecacheError, PrecacheFailure, WorkerState};
pub use rules::{ApiPatternSet, ExclusionSet, Route};
pub use status::{CacheStatus, ResponseSource, Served};
pub use store::{SkipReason, StoreRule, admit};

pub use plin_core::{
    BackendLabel, Destination, FetchRequest, FetchResponse, GenerationName, Offload, RequestKey,
    ResponseClass, StoredResponse, Transport, TransportError,
};

/// The `plin` prelude.
///
/// ```rust
/// use plin::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CacheController, ControllerConfig, ControllerError, Destination, EventLifetime,
        FetchRequest, FetchResponse, LifecycleEvent, Transport,
    };
}
