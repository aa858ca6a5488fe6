//! Outcome types describing how a request was served.

use plin_core::{BackendLabel, FetchResponse};

use crate::rules::Route;

/// What the cache contributed to a served response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// A stored entry answered the request and the network was not used.
    Hit,
    /// A stored entry answered the request while a refresh ran in the background.
    Stale,
    /// Nothing was stored, the network answered.
    Miss,
    /// The network answered first by strategy choice.
    Network,
    /// The network failed and a stored entry answered instead.
    Fallback,
    /// The request never touched the cache.
    Bypass,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Stale => "stale",
            CacheStatus::Miss => "miss",
            CacheStatus::Network => "network",
            CacheStatus::Fallback => "fallback",
            CacheStatus::Bypass => "bypass",
        }
    }

    /// Whether the response body came out of a generation.
    pub fn from_cache(&self) -> bool {
        matches!(
            self,
            CacheStatus::Hit | CacheStatus::Stale | CacheStatus::Fallback
        )
    }
}

/// Source of the response - either the network or a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// Response came from the network.
    #[default]
    Network,
    /// Response came from the backend with the given label.
    Backend(BackendLabel),
}

impl ResponseSource {
    /// Returns the source as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Backend(label) => label.as_str(),
        }
    }
}

/// A response handed back to the page, with the decisions that produced it.
#[derive(Debug, Clone)]
pub struct Served {
    /// The response itself.
    pub response: FetchResponse,
    /// Strategy the request was routed to.
    pub route: Route,
    /// How the cache took part.
    pub status: CacheStatus,
    /// Where the body came from.
    pub source: ResponseSource,
}

impl Served {
    pub(crate) fn network(response: FetchResponse, route: Route, status: CacheStatus) -> Self {
        Self {
            response,
            route,
            status,
            source: ResponseSource::Network,
        }
    }

    pub(crate) fn stored(
        response: FetchResponse,
        route: Route,
        status: CacheStatus,
        label: BackendLabel,
    ) -> Self {
        Self {
            response,
            route,
            status,
            source: ResponseSource::Backend(label),
        }
    }

    /// Consumes the outcome, keeping only the response.
    pub fn into_response(self) -> FetchResponse {
        self.response
    }
}
