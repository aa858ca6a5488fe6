//! Metrics declaration and recording.

#[cfg(feature = "metrics")]
use crate::status::CacheStatus;
use crate::status::Served;
use plin_core::BackendLabel;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Request outcome metrics

    /// Track number of requests answered by a stored entry alone.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_cache_hit_total",
            "Total number of requests served from a stored entry without the network."
        );
        "plin_cache_hit_total"
    };
    /// Track number of requests answered by a stored entry while revalidating.
    pub static ref CACHE_STALE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_cache_stale_total",
            "Total number of requests served from a stored entry with a background refresh."
        );
        "plin_cache_stale_total"
    };
    /// Track number of requests answered by the network.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_cache_miss_total",
            "Total number of requests served by the network."
        );
        "plin_cache_miss_total"
    };
    /// Track number of requests that never touched the cache.
    pub static ref CACHE_BYPASS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_cache_bypass_total",
            "Total number of requests passed straight to the network."
        );
        "plin_cache_bypass_total"
    };
    /// Track number of network failures answered from the cache.
    pub static ref CACHE_FALLBACK_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_cache_fallback_total",
            "Total number of network failures answered by a stored entry."
        );
        "plin_cache_fallback_total"
    };

    // Storage metrics

    /// Track number of responses written to the current generation.
    pub static ref STORE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_store_total",
            "Total number of responses written to the current generation."
        );
        "plin_store_total"
    };
    /// Track number of failed writes.
    pub static ref STORE_FAILED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_store_failed_total",
            "Total number of responses that could not be written."
        );
        "plin_store_failed_total"
    };
    /// Track number of generations deleted at activation.
    pub static ref GENERATIONS_DELETED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "plin_generations_deleted_total",
            "Total number of stale generations deleted at activation."
        );
        "plin_generations_deleted_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "plin_offload_tasks_spawned_total",
            "Total number of deferred tasks spawned."
        );
        "plin_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "plin_offload_tasks_completed_total",
            "Total number of deferred tasks completed."
        );
        "plin_offload_tasks_completed_total"
    };
    /// Track number of offload tasks that timed out.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "plin_offload_tasks_timeout_total",
            "Total number of deferred tasks cancelled by their timeout."
        );
        "plin_offload_tasks_timeout_total"
    };
    /// Gauge of currently active offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "plin_offload_tasks_active",
            "Number of currently running deferred tasks."
        );
        "plin_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "plin_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of deferred tasks in seconds."
        );
        "plin_offload_task_duration_seconds"
    };
}

/// Record how a request was served.
///
/// When the `metrics` feature is disabled, this function is a no-op.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_served(served: &Served) {
    let counter = match served.status {
        CacheStatus::Hit => *CACHE_HIT_COUNTER,
        CacheStatus::Stale => *CACHE_STALE_COUNTER,
        CacheStatus::Miss | CacheStatus::Network => *CACHE_MISS_COUNTER,
        CacheStatus::Fallback => *CACHE_FALLBACK_COUNTER,
        CacheStatus::Bypass => *CACHE_BYPASS_COUNTER,
    };
    metrics::counter!(
        counter,
        "route" => served.route.as_str(),
        "source" => served.source.as_str().to_string()
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_served(_served: &Served) {}

/// Record the outcome of one write to the current generation.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store(backend: &BackendLabel, stored: bool) {
    let counter = if stored {
        *STORE_COUNTER
    } else {
        *STORE_FAILED_COUNTER
    };
    metrics::counter!(counter, "backend" => backend.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store(_backend: &BackendLabel, _stored: bool) {}

/// Record generations removed by an activation.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_generations_deleted(count: usize) {
    metrics::counter!(*GENERATIONS_DELETED_COUNTER).increment(count as u64);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_generations_deleted(_count: usize) {}
