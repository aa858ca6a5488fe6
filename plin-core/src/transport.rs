//! Network transport trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::TransportError;
use crate::request::FetchRequest;
use crate::response::FetchResponse;

/// Trait for reaching the network with intercepted requests.
///
/// The controller never talks to sockets directly: every live response comes
/// through a `Transport`. Implementations must be cheap to share, the
/// controller calls them from concurrently running request handlers and from
/// background revalidation tasks.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use http::StatusCode;
/// use plin_core::{FetchRequest, FetchResponse, Transport, TransportError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Transport for Echo {
///     async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
///         Ok(FetchResponse::new(StatusCode::OK, request.url().clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and resolves to whatever the network answered.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        self.as_ref().fetch(request).await
    }
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        self.as_ref().fetch(request).await
    }
}
