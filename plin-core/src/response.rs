//! Network and cached responses, and their classification.
//!
//! Whether a response may be stored by the same-origin strategies depends on
//! where it came from and how it ended. [`ResponseClass::classify`] turns that
//! into an explicit value so the decision can be tested without a network:
//!
//! ```
//! use http::StatusCode;
//! use plin_core::{FetchResponse, ResponseClass};
//! use url::Url;
//!
//! let scope = Url::parse("https://plin.app/").unwrap();
//!
//! let local = FetchResponse::new(StatusCode::OK, Url::parse("https://plin.app/a.js").unwrap());
//! assert_eq!(ResponseClass::classify(&local, &scope), ResponseClass::SameOriginSuccess);
//!
//! let cdn = FetchResponse::new(StatusCode::OK, Url::parse("https://cdn.example/a.js").unwrap());
//! assert_eq!(ResponseClass::classify(&cdn, &scope), ResponseClass::CrossOriginOpaque);
//!
//! let missing = FetchResponse::new(StatusCode::NOT_FOUND, Url::parse("https://plin.app/b.js").unwrap());
//! assert_eq!(ResponseClass::classify(&missing, &scope), ResponseClass::Error);
//! ```

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use url::Url;

/// A response produced by the transport or read back from storage.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
}

impl FetchResponse {
    /// Creates an empty response with the given status and final URL.
    pub fn new(status: StatusCode, url: Url) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            url,
        }
    }

    /// Replaces the response headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the response body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Final URL of the response, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Splits the response into its parts.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes, Url) {
        (self.status, self.headers, self.body, self.url)
    }
}

/// Classification of a response relative to the controller's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Same origin as the scope and status 200.
    SameOriginSuccess,
    /// Served from another origin. The content is not ours to vouch for,
    /// whatever the status.
    CrossOriginOpaque,
    /// Same origin, any status other than 200.
    Error,
}

impl ResponseClass {
    /// Classifies `response` against the origin of `scope`.
    pub fn classify(response: &FetchResponse, scope: &Url) -> Self {
        if response.url().origin() != scope.origin() {
            ResponseClass::CrossOriginOpaque
        } else if response.status() == StatusCode::OK {
            ResponseClass::SameOriginSuccess
        } else {
            ResponseClass::Error
        }
    }

    /// Returns the class as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseClass::SameOriginSuccess => "same-origin-success",
            ResponseClass::CrossOriginOpaque => "cross-origin-opaque",
            ResponseClass::Error => "error",
        }
    }
}
