//! Admission rules for writing responses into a generation.
//!
//! Every store path in the controller goes through [`admit`]. The GET-only and
//! status-200 restrictions live here, so no strategy can persist a response
//! that breaks them regardless of the order of its own checks.

use http::{Method, StatusCode};
use plin_core::{FetchResponse, ResponseClass};
use url::Url;

/// How strict a store path is about where the response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRule {
    /// Only same-origin 200 responses. Used by cache-first and
    /// stale-while-revalidate.
    SameOrigin,
    /// Any 200 response. Used by network-first and install population.
    AnyOrigin,
}

/// Why a response was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The request method is not GET.
    Method,
    /// The response status is not 200.
    Status,
    /// The response came from a foreign origin under [`StoreRule::SameOrigin`].
    CrossOrigin,
}

impl SkipReason {
    /// Returns the reason as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Method => "method",
            SkipReason::Status => "status",
            SkipReason::CrossOrigin => "cross_origin",
        }
    }
}

/// Decides whether `response` to a `method` request may be stored.
pub fn admit(
    rule: StoreRule,
    method: &Method,
    response: &FetchResponse,
    scope: &Url,
) -> Result<(), SkipReason> {
    if *method != Method::GET {
        return Err(SkipReason::Method);
    }
    match rule {
        StoreRule::AnyOrigin if response.status() == StatusCode::OK => Ok(()),
        StoreRule::AnyOrigin => Err(SkipReason::Status),
        StoreRule::SameOrigin => match ResponseClass::classify(response, scope) {
            ResponseClass::SameOriginSuccess => Ok(()),
            ResponseClass::CrossOriginOpaque => Err(SkipReason::CrossOrigin),
            ResponseClass::Error => Err(SkipReason::Status),
        },
    }
}
