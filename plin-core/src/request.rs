//! Intercepted request description.

use std::str::FromStr;

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use crate::key::RequestKey;

/// Header browsers use to announce a request's destination.
pub const SEC_FETCH_DEST: &str = "sec-fetch-dest";

/// What the requested resource will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Destination {
    /// Top-level or frame navigation.
    Document,
    /// Classic and module `<script>` elements. Workers are `Other`.
    Script,
    /// Stylesheets.
    Style,
    /// Images, including favicons.
    Image,
    /// Web fonts.
    Font,
    /// Web app manifest.
    Manifest,
    /// `fetch()`/XHR calls with no particular destination.
    #[default]
    Empty,
    /// Anything else (workers, audio, video, track, ...).
    Other,
}

impl Destination {
    /// Long-lived, versioned resources served cache-first.
    pub fn is_static_asset(self) -> bool {
        matches!(
            self,
            Destination::Script | Destination::Style | Destination::Image | Destination::Font
        )
    }

    /// Returns the `Sec-Fetch-Dest` token for this destination.
    pub const fn as_str(self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Image => "image",
            Destination::Font => "font",
            Destination::Manifest => "manifest",
            Destination::Empty => "empty",
            Destination::Other => "other",
        }
    }
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "script" => Destination::Script,
            "style" => Destination::Style,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            "" | "empty" => Destination::Empty,
            _ => Destination::Other,
        })
    }
}

/// A request intercepted by the controller.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: Url,
    destination: Destination,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchRequest {
    /// Creates a request with an empty body and no headers.
    pub fn new(method: Method, url: Url, destination: Destination) -> Self {
        Self {
            method,
            url,
            destination,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: Url, destination: Destination) -> Self {
        Self::new(Method::GET, url, destination)
    }

    /// Builds a request from an `http::Request`, reading the destination from
    /// the `Sec-Fetch-Dest` header.
    ///
    /// Returns `None` when the request URI is not an absolute URL.
    pub fn from_http(request: http::Request<Bytes>) -> Option<Self> {
        let (parts, body) = request.into_parts();
        let url = Url::parse(&parts.uri.to_string()).ok()?;
        let destination = parts
            .headers
            .get(SEC_FETCH_DEST)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.parse::<Destination>().unwrap_or_default())
            .unwrap_or_default();
        Some(Self {
            method: parts.method,
            url,
            destination,
            headers: parts.headers,
            body,
        })
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request destination.
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Key under which a response to this request is stored.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_assets() {
        assert!(Destination::Script.is_static_asset());
        assert!(Destination::Style.is_static_asset());
        assert!(Destination::Image.is_static_asset());
        assert!(Destination::Font.is_static_asset());
        assert!(!Destination::Document.is_static_asset());
        assert!(!Destination::Manifest.is_static_asset());
        assert!(!Destination::Empty.is_static_asset());
    }

    #[test]
    fn destination_from_sec_fetch_dest() {
        let request = http::Request::builder()
            .uri("https://plin.app/js/app.js")
            .header(SEC_FETCH_DEST, "script")
            .body(Bytes::new())
            .unwrap();
        let request = FetchRequest::from_http(request).unwrap();
        assert_eq!(request.destination(), Destination::Script);
        assert_eq!(request.url().path(), "/js/app.js");
    }

    #[test]
    fn worker_destinations_are_not_scripts() {
        for token in ["worker", "sharedworker", "serviceworker"] {
            let destination: Destination = token.parse().unwrap();
            assert_eq!(destination, Destination::Other, "{token}");
            assert!(!destination.is_static_asset());
        }
    }

    #[test]
    fn missing_header_defaults_to_empty() {
        let request = http::Request::builder()
            .uri("https://plin.app/api/trips")
            .body(Bytes::new())
            .unwrap();
        let request = FetchRequest::from_http(request).unwrap();
        assert_eq!(request.destination(), Destination::Empty);
    }

    #[test]
    fn relative_uri_is_rejected() {
        let request = http::Request::builder()
            .uri("/js/app.js")
            .body(Bytes::new())
            .unwrap();
        assert!(FetchRequest::from_http(request).is_none());
    }
}
