//! Request keys identifying stored entries.
//!
//! A stored entry is addressed by the request's method and URL. The fragment
//! never reaches the network, so it is stripped before the key is built and
//! `https://plin.app/#trips` shares an entry with `https://plin.app/`.
//!
//! ## Format
//!
//! When displayed, keys follow `{METHOD} {url}`:
//!
//! ```
//! use http::Method;
//! use plin_core::RequestKey;
//! use url::Url;
//!
//! let url = Url::parse("https://plin.app/css/style.css#top").unwrap();
//! let key = RequestKey::new(&Method::GET, &url);
//! assert_eq!(key.to_string(), "GET https://plin.app/css/style.css");
//! ```
//!
//! ## Performance
//!
//! [`RequestKey`] wraps its data in an `Arc`, so cloning a key only bumps a
//! reference count. Keys are cloned into every background store task.

use http::Method;
use serde::{Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Eq, PartialEq, Hash)]
struct RequestKeyInner {
    method: SmolStr,
    url: String,
}

/// Identity of a stored entry: method plus fragment-less URL.
#[derive(Clone, Debug)]
pub struct RequestKey {
    inner: Arc<RequestKeyInner>,
}

impl RequestKey {
    /// Builds a key from a method and URL, dropping the URL fragment.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        RequestKey {
            inner: Arc::new(RequestKeyInner {
                method: SmolStr::new(method.as_str()),
                url: url.into(),
            }),
        }
    }

    /// Returns the method part of the key.
    #[inline]
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// Returns the URL part of the key.
    #[inline]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Estimated memory footprint, used by size-aware backends.
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<RequestKeyInner>() + self.inner.url.len()
    }
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}

impl Serialize for RequestKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
