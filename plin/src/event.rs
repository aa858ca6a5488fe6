//! Host-facing event adapter.
//!
//! A host delivers [`LifecycleEvent`]s and gets back a [`Handled`] value. The
//! result is available right away, but the event only counts as handled once
//! its [`EventLifetime`] has settled: cache writes and background
//! revalidation registered during the event keep it alive until they finish.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use plin_core::{FetchRequest, Offload};
use smol_str::SmolStr;

use crate::error::ControllerError;
use crate::lifecycle::{ActivateReport, InstallReport};
use crate::offload::{OffloadManager, TimeoutPolicy};
use crate::status::Served;

/// Events a host delivers to the controller.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A new version was downloaded and should populate its generation.
    Install,
    /// The new version takes over and cleans up old generations.
    Activate,
    /// A page issued a request.
    Fetch(FetchRequest),
}

impl LifecycleEvent {
    /// Returns the event name as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Fetch(_) => "fetch",
        }
    }
}

/// What the controller answered for an event.
#[derive(Debug)]
pub enum EventResponse {
    /// Answer to [`LifecycleEvent::Install`].
    Installed(InstallReport),
    /// Answer to [`LifecycleEvent::Activate`].
    Activated(ActivateReport),
    /// Answer to [`LifecycleEvent::Fetch`].
    Fetched(Served),
}

/// Result of handling an event, plus the work still attached to it.
#[derive(Debug)]
pub struct Handled {
    /// The controller's answer.
    pub result: Result<EventResponse, ControllerError>,
    /// Deferred work registered while handling the event.
    pub lifetime: EventLifetime,
}

impl Handled {
    /// Waits for the event's deferred work, then yields the answer.
    pub async fn settle(self) -> Result<EventResponse, ControllerError> {
        self.lifetime.settled().await;
        self.result
    }
}

/// Registry of deferred work keeping one event alive.
///
/// Each event gets its own lifetime. Everything spawned on it is tracked until
/// completion, and [`settled`](Self::settled) resolves once nothing is left.
#[derive(Debug, Clone)]
pub struct EventLifetime {
    offload: OffloadManager,
}

impl EventLifetime {
    /// Creates an empty lifetime applying `policy` to its tasks.
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self {
            offload: OffloadManager::new(policy),
        }
    }

    /// Number of registered tasks still running.
    pub fn pending(&self) -> usize {
        self.offload.active_task_count()
    }

    /// Resolves once every registered task has finished, including tasks
    /// registered by other tasks in the meantime.
    pub async fn settled(&self) {
        self.offload.wait_all().await;
    }

    /// Like [`settled`](Self::settled) with an upper bound. Returns `false` if
    /// work was still pending when `timeout` elapsed.
    pub async fn settled_within(&self, timeout: Duration) -> bool {
        self.offload.wait_all_timeout(timeout).await
    }

    /// Aborts everything still pending and refuses new work. Used when the
    /// host tears the agent down between events.
    pub fn abandon(&self) {
        self.offload.close();
    }

    /// Whether [`abandon`](Self::abandon) was called.
    pub fn is_abandoned(&self) -> bool {
        self.offload.is_closed()
    }
}

impl Default for EventLifetime {
    fn default() -> Self {
        Self::new(TimeoutPolicy::default())
    }
}

impl Offload for EventLifetime {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.offload.spawn(kind, future);
    }
}

/// Capabilities the controller needs from its host.
///
/// Both calls default to no-ops, hosts without waiting instances or client
/// views only implement what applies to them.
#[async_trait]
pub trait Host: Send + Sync {
    /// Activate this instance immediately instead of waiting for older
    /// instances to release their clients.
    async fn skip_waiting(&self) {}

    /// Take control of every open client view without a reload.
    async fn claim_clients(&self) {}
}

/// Host without waiting instances or client views.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl Host for NoopHost {}

#[async_trait]
impl<T> Host for Arc<T>
where
    T: Host + ?Sized,
{
    async fn skip_waiting(&self) {
        self.as_ref().skip_waiting().await
    }

    async fn claim_clients(&self) {
        self.as_ref().claim_clients().await
    }
}
