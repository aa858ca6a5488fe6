//! Transport over a reqwest client.

use async_trait::async_trait;
use bytes::Bytes;
use plin_core::{FetchRequest, FetchResponse, Transport, TransportError};
use tracing::{debug, trace};

/// Sends intercepted requests through a [`reqwest::Client`].
///
/// Cloning is cheap, the client is reference counted.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing client. Timeouts, redirect policy and TLS come from
    /// the client's own configuration.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

/// Converts a [`FetchRequest`] into a `reqwest::Request` by way of
/// `http::Request`.
fn into_reqwest(request: &FetchRequest) -> Result<reqwest::Request, TransportError> {
    let mut http_request = http::Request::builder()
        .method(request.method().clone())
        .uri(request.url().as_str())
        .body(request.body().clone())
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    *http_request.headers_mut() = request.headers().clone();

    reqwest::Request::try_from(http_request)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else if error.is_connect() || error.is_timeout() {
        TransportError::Unreachable(Box::new(error))
    } else {
        TransportError::Exchange(Box::new(error))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let outgoing = into_reqwest(&request)?;
        trace!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(outgoing).await.map_err(|error| {
            debug!(url = %request.url(), %error, "request failed");
            map_error(error)
        })?;

        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body: Bytes = response.bytes().await.map_err(map_error)?;

        debug!(
            url = %request.url(),
            final_url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );
        Ok(FetchResponse::new(status, url)
            .with_headers(headers)
            .with_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, Method};
    use plin_core::Destination;
    use url::Url;

    #[test]
    fn request_conversion_keeps_method_headers_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trip", HeaderValue::from_static("kyoto"));
        let request = FetchRequest::new(
            Method::POST,
            Url::parse("https://plin.app/api/trips?draft=1").unwrap(),
            Destination::Empty,
        )
        .with_headers(headers)
        .with_body("{}");

        let converted = into_reqwest(&request).unwrap();

        assert_eq!(converted.method(), Method::POST);
        assert_eq!(converted.url().as_str(), "https://plin.app/api/trips?draft=1");
        assert_eq!(converted.headers()["x-trip"], "kyoto");
        assert_eq!(
            converted.body().and_then(|b| b.as_bytes()),
            Some(&b"{}"[..])
        );
    }
}
