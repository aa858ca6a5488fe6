//! Caching strategies.
//!
//! Each strategy is a method on [`CacheController`](crate::CacheController)
//! selected by [`Route`](crate::Route). They share the controller's
//! best-effort `lookup` and admission-guarded `store`.

mod bypass;
mod cache_first;
mod network_first;
mod stale_while_revalidate;
