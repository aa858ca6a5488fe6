#![warn(missing_docs)]
//! # plin-core
//!
//! Core traits and types for the plin offline cache controller.
//!
//! This crate holds the protocol-level vocabulary shared by every other crate
//! in the workspace. Storage backends (`plin-moka`), transports
//! (`plin-reqwest`) and the controller itself (`plin`) only talk to each other
//! through these types:
//!
//! - **Describe** an intercepted request ([`FetchRequest`], [`Destination`])
//! - **Identify** stored entries ([`RequestKey`], [`GenerationName`])
//! - **Classify** responses ([`FetchResponse`], [`ResponseClass`])
//! - **Snapshot** responses for storage ([`StoredResponse`])
//! - **Reach** the network ([`Transport`])
//! - **Defer** background work ([`Offload`])

pub mod entry;
pub mod error;
pub mod generation;
pub mod key;
pub mod label;
pub mod offload;
pub mod request;
pub mod response;
pub mod transport;

pub use entry::StoredResponse;
pub use error::TransportError;
pub use generation::GenerationName;
pub use key::RequestKey;
pub use label::BackendLabel;
pub use offload::Offload;
pub use request::{Destination, FetchRequest};
pub use response::{FetchResponse, ResponseClass};
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use transport::Transport;

/// Raw byte data type used for serialized stored entries.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
