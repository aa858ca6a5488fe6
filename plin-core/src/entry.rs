//! Serializable snapshots of stored responses.
//!
//! [`StoredResponse`] is what actually lands in a generation. It captures the
//! status, headers, body and final URL of a response at the moment it was
//! stored, and converts back into a [`FetchResponse`] on a cache hit.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::response::FetchResponse;

/// Snapshot of a response, as persisted by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    status: u16,
    headers: Vec<(String, Vec<u8>)>,
    body: Bytes,
    url: String,
    stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Captures `response`, stamping it with the current time.
    pub fn capture(response: &FetchResponse) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| (name.as_str().to_owned(), value.as_bytes().to_vec()))
                .collect(),
            body: response.body().clone(),
            url: response.url().as_str().to_owned(),
            stored_at: Utc::now(),
        }
    }

    /// When the snapshot was taken.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Stored status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Stored body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Rebuilds the response.
    ///
    /// Returns `None` if the snapshot no longer decodes into a valid status or
    /// URL, which only happens if the stored bytes were tampered with. Header
    /// pairs that fail to parse are dropped.
    pub fn into_response(self) -> Option<FetchResponse> {
        let status = StatusCode::from_u16(self.status).ok()?;
        let url = Url::parse(&self.url).ok()?;
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(&value),
            ) else {
                continue;
            };
            headers.append(name, value);
        }
        Some(
            FetchResponse::new(status, url)
                .with_headers(headers)
                .with_body(self.body),
        )
    }
}
