//! In-memory generation store for plin, backed by [Moka](https://docs.rs/moka).
//!
//! Each cache generation gets its own Moka cache, created lazily the first
//! time the generation is opened or written to. Deleting a generation drops
//! its cache wholesale.
//!
//! ```
//! use plin_moka::MokaBackend;
//!
//! let backend = MokaBackend::builder().max_entries(1_000).build();
//! ```
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
