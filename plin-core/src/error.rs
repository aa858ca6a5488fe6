//! Error types for network transports.

use thiserror::Error;

/// Failure to obtain any response from the network.
///
/// HTTP error statuses are not transport errors: a `404` is a response and is
/// returned as one. Only failures that leave the caller without a response end
/// up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The network could not be reached (DNS, connect, TLS, offline).
    #[error("network unreachable: {0}")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The connection was established but the exchange failed midway.
    #[error("network exchange failed: {0}")]
    Exchange(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request could not be expressed by the transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Convenience constructor for an unreachable network with a message.
    pub fn offline(message: impl Into<String>) -> Self {
        TransportError::Unreachable(message.into().into())
    }
}
