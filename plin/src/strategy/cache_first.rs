use plin_backend::CacheBackend;
use plin_core::{FetchRequest, Transport};

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
    /// Stored entry if present, without touching the network. On a miss the
    /// network answers and same-origin successes are stored. Network failures
    /// propagate.
    pub(crate) async fn cache_first(
        &self,
        request: FetchRequest,
        lifetime: &EventLifetime,
    ) -> Result<Served, ControllerError> {
        let key = request.key();
        if let Some(response) = self.lookup(&key).await {
            return Ok(Served::stored(
                response,
                Route::CacheFirst,
                CacheStatus::Hit,
                self.inner.backend.label(),
            ));
        }

        let method = request.method().clone();
        let response = self.inner.transport.fetch(request).await?;
        self.store(StoreRule::SameOrigin, &method, key, &response, lifetime);
        Ok(Served::network(response, Route::CacheFirst, CacheStatus::Miss))
    }
}
