use plin_backend::CacheBackend;
use plin_core::{FetchRequest, Transport};

use crate::controller::CacheController;
use crate::error::ControllerError;
use crate::event::Host;
use crate::rules::Route;
use crate::status::{CacheStatus, Served};

impl<B, T, H> CacheController<B, T, H>
where
    B: CacheBackend + 'static,
    T: Transport + 'static,
    H: Host + 'static,
{
    /// Straight to the network. No generation is read or written.
    pub(crate) async fn bypass(&self, request: FetchRequest) -> Result<Served, ControllerError> {
        let response = self.inner.transport.fetch(request).await?;
        Ok(Served::network(response, Route::Bypass, CacheStatus::Bypass))
    }
}
