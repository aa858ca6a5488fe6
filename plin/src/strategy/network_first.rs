use plin_backend::CacheBackend;
use plin_core::{FetchRequest, Transport};
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
    /// Live response whenever the network answers, stored without delaying
    /// it. When the network fails the stored entry stands in; without one the
    /// failure propagates.
    pub(crate) async fn network_first(
        &self,
        request: FetchRequest,
        lifetime: &EventLifetime,
    ) -> Result<Served, ControllerError> {
        let key = request.key();
        let method = request.method().clone();

        match self.inner.transport.fetch(request).await {
            Ok(response) => {
                self.store(StoreRule::AnyOrigin, &method, key, &response, lifetime);
                Ok(Served::network(
                    response,
                    Route::NetworkFirst,
                    CacheStatus::Network,
                ))
            }
            Err(error) => match self.lookup(&key).await {
                Some(response) => {
                    debug!(%key, %error, "network failed, serving stored entry");
                    Ok(Served::stored(
                        response,
                        Route::NetworkFirst,
                        CacheStatus::Fallback,
                        self.inner.backend.label(),
                    ))
                }
                None => Err(error.into()),
            },
        }
    }
}
