use plin_backend::CacheBackend;
use plin_core::{FetchRequest, FetchResponse, Offload, Transport, TransportError};
use tokio::sync::oneshot;
use tracing::debug;

use crate::controller::CacheController;
use crate::error::ControllerError;
use crate::event::{EventLifetime, Host};
use crate::rules::Route;
use crate::status::{CacheStatus, Served};
use crate::store::StoreRule;

impl<B, T, H> CacheController<B, T, H>
where
    B: CacheBackend + 'static,
    T: Transport + 'static,
    H: Host + 'static,
{
    /// Lookup and network fetch run concurrently. A stored entry answers
    /// immediately while the fetch refreshes it in the background; without
    /// one the caller waits for the fetch.
    ///
    /// The fetch runs on the event's lifetime, so it is tracked, bounded and
    /// torn down with the event. A failed background refresh is logged and
    /// dropped: the caller has already been answered.
    pub(crate) async fn stale_while_revalidate(
        &self,
        request: FetchRequest,
        lifetime: &EventLifetime,
    ) -> Result<Served, ControllerError> {
        let key = request.key();
        let method = request.method().clone();
        let (tx, rx) = oneshot::channel::<Result<FetchResponse, TransportError>>();

        {
            let this = self.clone();
            let store_lifetime = lifetime.clone();
            let key = key.clone();
            lifetime.spawn("revalidate", async move {
                let result = this.inner.transport.fetch(request).await;
                match &result {
                    Ok(response) => {
                        this.store(StoreRule::SameOrigin, &method, key, response, &store_lifetime)
                    }
                    Err(error) => debug!(%key, %error, "revalidation fetch failed"),
                }
                // Nobody listens once a stored entry has answered.
                let _ = tx.send(result);
            });
        }

        match self.lookup(&key).await {
            Some(stale) => Ok(Served::stored(
                stale,
                Route::StaleWhileRevalidate,
                CacheStatus::Stale,
                self.inner.backend.label(),
            )),
            None => match rx.await {
                Ok(Ok(response)) => Ok(Served::network(
                    response,
                    Route::StaleWhileRevalidate,
                    CacheStatus::Miss,
                )),
                Ok(Err(error)) => Err(error.into()),
                Err(_) => Err(ControllerError::Interrupted(format!(
                    "revalidation of {key} was cancelled"
                ))),
            },
        }
    }
}
