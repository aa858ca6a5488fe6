//! Persistent generation store for plin, backed by
//! [FeOxDB](https://docs.rs/feoxdb).
//!
//! Entries survive restarts, so an installed generation keeps serving while
//! the process is offline. All generations share one store file: entry keys
//! are prefixed with their generation name and a small index records which
//! generations exist and which keys each one holds, so deleting a generation
//! drops exactly its entries.
//!
//! ```no_run
//! use plin_feoxdb::FeOxDbBackend;
//!
//! let backend = FeOxDbBackend::builder()
//!     .path("/var/cache/plin")
//!     .build()?;
//! # Ok::<(), plin_feoxdb::FeOxDbError>(())
//! ```
#![warn(missing_docs)]

mod backend;
mod error;

pub use backend::{FeOxDbBackend, FeOxDbBackendBuilder};
pub use error::FeOxDbError;
