//! Deferred work tracking.
//!
//! Handlers answer a request before all their work is done: cache writes and
//! background revalidation keep running afterwards. The [`OffloadManager`]
//! spawns that work on tokio and counts it, so whoever owns the event can wait
//! for it to drain, or close it so that nothing lands afterwards.
//!
//! # Example
//!
//! ```ignore
//! use plin::offload::{OffloadManager, TimeoutPolicy};
//!
//! let manager = OffloadManager::new(TimeoutPolicy::Unbounded);
//! manager.spawn("store", async {
//!     // write to the current generation
//! });
//! manager.wait_all().await;
//! ```

mod manager;
mod policy;

pub use manager::{OffloadKey, OffloadManager};
pub use policy::TimeoutPolicy;
