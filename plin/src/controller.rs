//! The cache controller.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures::future::{join_all, try_join_all};
use http::Method;
use plin_backend::{CacheBackend, DeleteStatus};
use plin_core::{
    Destination, FetchRequest, FetchResponse, GenerationName, Offload, RequestKey, StoredResponse,
    Transport,
};
use tracing::{Instrument, debug, debug_span, info, warn};
use url::Url;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::event::{EventLifetime, EventResponse, Handled, Host, LifecycleEvent, NoopHost};
use crate::lifecycle::{ActivateReport, InstallReport, PrecacheError, PrecacheFailure, WorkerState};
use crate::metrics;
use crate::rules::Route;
use crate::status::{CacheStatus, Served};
use crate::store::{StoreRule, admit};

pub(crate) struct Inner<B, T, H> {
    pub(crate) config: ControllerConfig,
    pub(crate) backend: B,
    pub(crate) transport: T,
    pub(crate) host: H,
    state: AtomicU8,
}

/// Offline cache controller.
///
/// Routes every intercepted request to a caching strategy, keeps the current
/// generation populated and removes stale generations on activation.
///
/// # Type Parameters
///
/// * `B` - Storage backend holding the generations. Implements [`CacheBackend`].
/// * `T` - Network transport. Implements [`Transport`].
/// * `H` - Host capabilities used by the lifecycle. Implements [`Host`].
///   Default: [`NoopHost`].
///
/// Cloning is cheap; clones share the backend, transport and lifecycle state.
///
/// # Examples
///
/// ```ignore
/// use plin::{CacheController, ControllerConfig, EventLifetime};
/// use plin_core::{Destination, FetchRequest};
///
/// let controller = CacheController::new(ControllerConfig::production()?, backend, transport);
/// controller.install().await?;
/// controller.activate().await?;
///
/// let lifetime = controller.lifetime();
/// let request = FetchRequest::get(url, Destination::Style);
/// let served = controller.fetch(request, &lifetime).await?;
/// lifetime.settled().await;
/// ```
pub struct CacheController<B, T, H = NoopHost> {
    pub(crate) inner: Arc<Inner<B, T, H>>,
}

impl<B, T, H> Clone for CacheController<B, T, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, T, H> fmt::Debug for CacheController<B, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheController")
            .field("generation", self.inner.config.generation())
            .field("scope", &self.inner.config.scope().as_str())
            .field(
                "state",
                &WorkerState::from_u8(self.inner.state.load(Ordering::SeqCst)),
            )
            .finish_non_exhaustive()
    }
}

impl<B, T> CacheController<B, T, NoopHost>
where
    B: CacheBackend + 'static,
    T: Transport + 'static,
{
    /// Creates a controller for a host with no waiting instances or clients.
    pub fn new(config: ControllerConfig, backend: B, transport: T) -> Self {
        Self::with_host(config, backend, transport, NoopHost)
    }
}

impl<B, T, H> CacheController<B, T, H>
where
    B: CacheBackend + 'static,
    T: Transport + 'static,
    H: Host + 'static,
{
    /// Creates a controller that drives `host` during the lifecycle.
    pub fn with_host(config: ControllerConfig, backend: B, transport: T, host: H) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                transport,
                host,
                state: AtomicU8::new(WorkerState::Parsed as u8),
            }),
        }
    }

    /// The configuration this controller runs with.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// The storage backend.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Name of the current generation.
    pub fn generation(&self) -> &GenerationName {
        self.inner.config.generation()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: WorkerState) {
        self.inner.state.store(state as u8, Ordering::SeqCst);
    }

    /// A fresh lifetime for one event, using the configured offload policy.
    pub fn lifetime(&self) -> EventLifetime {
        EventLifetime::new(self.inner.config.deferred_timeout())
    }

    /// Picks the strategy for `request`. Pure and synchronous.
    pub fn route(&self, request: &FetchRequest) -> Route {
        let config = &self.inner.config;
        if config.exclusions().matches(request.url()) {
            Route::Bypass
        } else if request.destination().is_static_asset() {
            Route::CacheFirst
        } else if config.api_patterns().matches(request.url()) {
            Route::NetworkFirst
        } else {
            Route::StaleWhileRevalidate
        }
    }

    /// Handles one host event.
    pub async fn handle(&self, event: LifecycleEvent) -> Handled {
        let lifetime = self.lifetime();
        let result = match event {
            LifecycleEvent::Install => self.install().await.map(EventResponse::Installed),
            LifecycleEvent::Activate => self.activate().await.map(EventResponse::Activated),
            LifecycleEvent::Fetch(request) => self
                .fetch(request, &lifetime)
                .await
                .map(EventResponse::Fetched),
        };
        Handled { result, lifetime }
    }

    /// Opens the current generation and stores the precache manifest.
    ///
    /// Assets are fetched concurrently and each one is best-effort: failures
    /// are logged and listed in the report. Only failing to open the
    /// generation is an error. Afterwards the host is asked to activate this
    /// instance right away.
    pub async fn install(&self) -> Result<InstallReport, ControllerError> {
        self.set_state(WorkerState::Installing);
        let generation = self.generation().clone();

        if let Err(error) = self.inner.backend.open(&generation).await {
            warn!(%generation, %error, "failed to open generation");
            self.set_state(WorkerState::Parsed);
            return Err(error.into());
        }

        let manifest = self.inner.config.precache();
        let outcomes = join_all(manifest.iter().map(|url| self.precache(url))).await;

        let mut report = InstallReport {
            generation,
            stored: Vec::with_capacity(manifest.len()),
            failed: Vec::new(),
        };
        for (url, outcome) in manifest.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.stored.push(url.clone()),
                Err(error) => {
                    warn!(%url, %error, "failed to precache asset");
                    report.failed.push(PrecacheFailure {
                        url: url.clone(),
                        error,
                    });
                }
            }
        }

        self.inner.host.skip_waiting().await;
        self.set_state(WorkerState::Installed);
        info!(
            generation = %report.generation,
            stored = report.stored.len(),
            failed = report.failed.len(),
            "installed"
        );
        Ok(report)
    }

    async fn precache(&self, url: &Url) -> Result<(), PrecacheError> {
        let request = FetchRequest::get(url.clone(), Destination::Empty);
        let key = request.key();
        let response = self.inner.transport.fetch(request).await?;
        if admit(
            StoreRule::AnyOrigin,
            &Method::GET,
            &response,
            self.inner.config.scope(),
        )
        .is_err()
        {
            return Err(PrecacheError::Status(response.status()));
        }
        self.inner
            .backend
            .set(self.generation(), &key, &StoredResponse::capture(&response))
            .await?;
        Ok(())
    }

    /// Deletes every generation other than the current one and takes control
    /// of open clients. Running it again is a no-op.
    pub async fn activate(&self) -> Result<ActivateReport, ControllerError> {
        self.set_state(WorkerState::Activating);
        match self.remove_stale_generations().await {
            Ok(deleted) => {
                self.inner.host.claim_clients().await;
                self.set_state(WorkerState::Activated);
                metrics::record_generations_deleted(deleted.len());
                info!(
                    generation = %self.generation(),
                    deleted = deleted.len(),
                    "activated"
                );
                Ok(ActivateReport {
                    current: self.generation().clone(),
                    deleted,
                })
            }
            Err(error) => {
                warn!(%error, "activation failed");
                self.set_state(WorkerState::Installed);
                Err(error)
            }
        }
    }

    async fn remove_stale_generations(&self) -> Result<Vec<GenerationName>, ControllerError> {
        let current = self.generation();
        let stale: Vec<GenerationName> = self
            .inner
            .backend
            .generations()
            .await?
            .into_iter()
            .filter(|name| name.is_stale(current))
            .collect();

        let statuses = try_join_all(
            stale
                .iter()
                .map(|name| self.inner.backend.delete_generation(name)),
        )
        .await?;

        let deleted = stale
            .into_iter()
            .zip(statuses)
            .filter_map(|(name, status)| match status {
                DeleteStatus::Deleted(_) => {
                    debug!(generation = %name, "deleted stale generation");
                    Some(name)
                }
                DeleteStatus::Missing => None,
            })
            .collect();
        Ok(deleted)
    }

    /// Answers an intercepted request.
    ///
    /// Deferred work (cache writes and background revalidation) is registered
    /// on `lifetime`; the response is available before that work finishes.
    /// The only error a page can observe is a network failure nothing stored
    /// could stand in for.
    pub async fn fetch(
        &self,
        request: FetchRequest,
        lifetime: &EventLifetime,
    ) -> Result<Served, ControllerError> {
        let route = self.route(&request);
        let span = debug_span!(
            "fetch",
            method = %request.method(),
            url = %request.url(),
            route = route.as_str()
        );

        async move {
            let served = match route {
                Route::Bypass => self.bypass(request).await,
                Route::CacheFirst => self.cache_first(request, lifetime).await,
                Route::NetworkFirst => self.network_first(request, lifetime).await,
                Route::StaleWhileRevalidate => self.stale_while_revalidate(request, lifetime).await,
            }?;
            debug!(
                status = served.status.as_str(),
                source = served.source.as_str(),
                "served"
            );
            metrics::record_served(&served);
            Ok(served)
        }
        .instrument(span)
        .await
    }

    /// Stored entry for `key` in the current generation.
    ///
    /// Storage is best-effort: read failures and unreadable entries count as
    /// misses.
    pub(crate) async fn lookup(&self, key: &RequestKey) -> Option<FetchResponse> {
        match self.inner.backend.get(self.generation(), key).await {
            Ok(Some(entry)) => {
                let response = entry.into_response();
                if response.is_none() {
                    warn!(%key, "discarding unreadable stored entry");
                }
                response
            }
            Ok(None) => None,
            Err(error) => {
                warn!(%key, %error, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Registers a write of `response` under `key` if `rule` admits it.
    ///
    /// The write runs on `lifetime` and never affects the response being
    /// returned.
    pub(crate) fn store(
        &self,
        rule: StoreRule,
        method: &Method,
        key: RequestKey,
        response: &FetchResponse,
        lifetime: &EventLifetime,
    ) {
        if let Err(reason) = admit(rule, method, response, self.inner.config.scope()) {
            debug!(%key, status = %response.status(), reason = reason.as_str(), "not storing response");
            return;
        }
        let entry = StoredResponse::capture(response);
        let this = self.clone();
        lifetime.spawn("store", async move {
            this.write(&key, &entry).await;
        });
    }

    async fn write(&self, key: &RequestKey, entry: &StoredResponse) {
        let label = self.inner.backend.label();
        match self.inner.backend.set(self.generation(), key, entry).await {
            Ok(()) => {
                debug!(%key, backend = %label, "stored response");
                metrics::record_store(&label, true);
            }
            Err(error) => {
                warn!(%key, backend = %label, %error, "failed to store response");
                metrics::record_store(&label, false);
            }
        }
    }
}
