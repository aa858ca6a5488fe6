//! Tracked spawning of deferred work.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use smol_str::SmolStr;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::TimeoutPolicy;

#[cfg(feature = "metrics")]
use crate::metrics::{
    OFFLOAD_TASK_DURATION, OFFLOAD_TASKS_ACTIVE, OFFLOAD_TASKS_COMPLETED, OFFLOAD_TASKS_SPAWNED,
    OFFLOAD_TASKS_TIMEOUT,
};

/// Key identifying an offloaded task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffloadKey {
    /// Kind of the task (e.g., "store", "revalidate").
    pub kind: SmolStr,
    /// Unique identifier within the manager.
    pub id: u64,
}

#[derive(Debug)]
struct OffloadManagerInner {
    policy: TimeoutPolicy,
    tasks: DashMap<OffloadKey, JoinHandle<()>>,
    key_counter: AtomicU64,
    pending: AtomicUsize,
    idle: Notify,
    closed: AtomicBool,
}

/// Marks a task as finished when dropped, whether it ran to the end, timed
/// out or was aborted before its first poll.
struct Completion {
    inner: Arc<OffloadManagerInner>,
    key: OffloadKey,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.inner.tasks.remove(&self.key);
        #[cfg(feature = "metrics")]
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => self.key.kind.to_string()).decrement(1.0);
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Manager for offloading tasks to background execution.
///
/// Tracks every spawned task until it finishes and applies the timeout
/// policy. Once [closed](Self::close) it refuses new work, so nothing can
/// outlive a torn-down event.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<OffloadManagerInner>,
}

impl OffloadManager {
    /// Creates a manager applying `policy` to every task.
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self {
            inner: Arc::new(OffloadManagerInner {
                policy,
                tasks: DashMap::new(),
                key_counter: AtomicU64::new(0),
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Spawn a task of the given kind. The kind is used for metrics labels
    /// and tracing.
    ///
    /// After [`close`](Self::close) the task is dropped without running.
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, kind: impl Into<SmolStr>, task: F) -> OffloadKey
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.key_counter.fetch_add(1, Ordering::Relaxed);
        let key = OffloadKey {
            kind: kind.into(),
            id,
        };

        if self.is_closed() {
            debug!(?key, "Offload manager closed, dropping task");
            return key;
        }

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "kind" => key.kind.to_string()).increment(1);
            metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => key.kind.to_string()).increment(1.0);
        }

        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        let completion = Completion {
            inner: self.inner.clone(),
            key: key.clone(),
        };
        let handle = tokio::spawn(Self::run(self.inner.policy, task, completion));
        if !handle.is_finished() {
            self.inner.tasks.insert(key.clone(), handle);
        }
        // A task finishing between the check and the insert leaves a stale handle.
        self.inner.tasks.retain(|_, handle| !handle.is_finished());
        key
    }

    /// Number of tasks that have not finished yet.
    pub fn active_task_count(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Aborts every running task.
    pub fn cancel_all(&self) {
        for entry in self.inner.tasks.iter() {
            entry.abort();
        }
    }

    /// Refuses further work and aborts what is running.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.cancel_all();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Check if the task with the given key is still running.
    pub fn is_in_flight(&self, key: &OffloadKey) -> bool {
        self.inner.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    /// Wait for all tracked tasks to complete, including tasks spawned by
    /// tracked tasks while waiting.
    pub async fn wait_all(&self) {
        loop {
            let notified = self.inner.idle.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();
            if self.inner.pending.load(Ordering::Acquire) == 0 {
                break;
            }
            notified.await;
        }
    }

    /// Wait for all tasks with a timeout.
    ///
    /// Returns `true` if all tasks completed within the timeout,
    /// `false` if the timeout was reached.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }

    async fn run<F>(policy: TimeoutPolicy, task: F, completion: Completion)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = completion.key.clone();
        let span = info_span!("offload_task", kind = %key.kind, id = key.id);
        async move {
            let _completion = completion;
            let start = Instant::now();
            match policy {
                TimeoutPolicy::Unbounded => {
                    task.await;
                    Self::record_completion(start, &key.kind);
                }
                TimeoutPolicy::Cancel(budget) => {
                    match tokio::time::timeout(budget, task).await {
                        Ok(()) => Self::record_completion(start, &key.kind),
                        Err(_) => {
                            warn!(?key, "Offload task cancelled due to timeout");
                            Self::record_timeout(start, &key.kind);
                        }
                    }
                }
                TimeoutPolicy::Warn(budget) => {
                    task.await;
                    let elapsed = start.elapsed();
                    if elapsed > budget {
                        warn!(
                            ?key,
                            elapsed_ms = elapsed.as_millis(),
                            threshold_ms = budget.as_millis(),
                            "Offload task exceeded timeout threshold"
                        );
                    }
                    Self::record_completion(start, &key.kind);
                }
            }
        }
        .instrument(span)
        .await
    }

    #[cfg(feature = "metrics")]
    fn record_completion(start: Instant, kind: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_COMPLETED, "kind" => kind.to_string()).increment(1);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "kind" => kind.to_string()).record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_completion(_start: Instant, _kind: &SmolStr) {}

    #[cfg(feature = "metrics")]
    fn record_timeout(start: Instant, kind: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_TIMEOUT, "kind" => kind.to_string()).increment(1);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "kind" => kind.to_string()).record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_timeout(_start: Instant, _kind: &SmolStr) {}
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::new(TimeoutPolicy::default())
    }
}

impl plin_core::Offload for OffloadManager {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        OffloadManager::spawn(self, kind, future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_all_drains_nested_tasks() {
        let manager = OffloadManager::default();
        let done = Arc::new(AtomicUsize::new(0));

        let nested = manager.clone();
        let counter = done.clone();
        manager.spawn("outer", async move {
            let counter_inner = counter.clone();
            nested.spawn("inner", async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                counter_inner.fetch_add(1, Ordering::SeqCst);
            });
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.wait_all().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
        assert_eq!(manager.active_task_count(), 0);
    }

    #[tokio::test]
    async fn cancel_policy_stops_slow_tasks() {
        let manager = OffloadManager::new(TimeoutPolicy::Cancel(Duration::from_millis(10)));
        let finished = Arc::new(AtomicUsize::new(0));
        let flag = finished.clone();
        manager.spawn("slow", async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        assert!(manager.wait_all_timeout(Duration::from_secs(1)).await);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wait_all_timeout_reports_pending_work() {
        let manager = OffloadManager::default();
        manager.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        assert!(!manager.wait_all_timeout(Duration::from_millis(10)).await);
        manager.cancel_all();
        assert!(manager.wait_all_timeout(Duration::from_secs(1)).await);
        assert_eq!(manager.active_task_count(), 0);
    }

    #[tokio::test]
    async fn abort_before_first_poll_still_settles() {
        let manager = OffloadManager::default();
        let key = manager.spawn("store", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        manager.cancel_all();

        assert!(manager.wait_all_timeout(Duration::from_secs(1)).await);
        assert!(!manager.is_in_flight(&key));
    }

    #[tokio::test]
    async fn closed_manager_drops_new_work() {
        let manager = OffloadManager::default();
        manager.close();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let key = manager.spawn("store", async move {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(manager.is_closed());
        assert!(!manager.is_in_flight(&key));
        assert_eq!(manager.active_task_count(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
