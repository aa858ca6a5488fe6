//! Offload trait for deferred background work.
//!
//! This module provides the [`Offload`] trait which abstracts over the way a
//! handler registers work that must finish after it has already answered:
//! cache writes and background revalidation.

use std::future::Future;

use smol_str::SmolStr;

/// Trait for spawning deferred work.
///
/// The host treats an event as handled only once everything spawned through
/// its `Offload` has finished, so implementations must track what they spawn.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally to ensure all cloned instances
/// share the same state.
///
/// # Example
///
/// ```ignore
/// use plin_core::Offload;
///
/// fn offload_store<O: Offload>(offload: &O, key: String) {
///     offload.spawn("store", async move {
///         println!("Writing {key} to the current generation");
///     });
/// }
/// ```
pub trait Offload: Send + Sync + Clone {
    /// Spawn a future to be executed in the background.
    ///
    /// * `kind` - A label categorizing the task type (e.g., "store",
    ///   "revalidate"). Used for metrics and tracing.
    /// * `future` - The future to execute. Must be `Send + 'static` as it may
    ///   run on a different thread.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
