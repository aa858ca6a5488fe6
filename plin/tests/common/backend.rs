use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use plin::{BackendLabel, GenerationName, RequestKey};
use plin_backend::{Backend, BackendError, BackendResult, CacheBackend, DeleteStatus};
use plin_core::Raw;
use plin_moka::MokaBackend;

#[derive(Debug, Default)]
pub struct BackendCounters {
    pub read_count: AtomicUsize,
    pub write_count: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_open: AtomicBool,
}

/// Moka store that counts entry operations and can be told to fail.
#[derive(Clone, Debug)]
pub struct CountingBackend {
    pub inner: MokaBackend,
    pub counters: Arc<BackendCounters>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            inner: MokaBackend::builder().label("counting").max_entries(1_000).build(),
            counters: Arc::new(BackendCounters::default()),
        }
    }

    pub fn reads(&self) -> usize {
        self.counters.read_count.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.counters.write_count.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.counters.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.counters.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_open(&self, fail: bool) {
        self.counters.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Entries held by `generation` once Moka's pending maintenance has run.
    pub async fn settled_entry_count(&self, generation: &GenerationName) -> u64 {
        if let Some(cache) = self.inner.generation_cache(generation) {
            cache.run_pending_tasks().await;
        }
        self.inner.entry_count(generation)
    }

    /// Whether `generation` holds anything under `key`, bypassing the counters.
    pub async fn contains(&self, generation: &GenerationName, key: &RequestKey) -> bool {
        self.inner.read(generation, key).await.unwrap().is_some()
    }
}

fn injected(what: &str) -> BackendError {
    BackendError::ConnectionError(format!("injected {what} failure").into())
}

#[async_trait]
impl Backend for CountingBackend {
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        if self.counters.fail_open.load(Ordering::SeqCst) {
            return Err(injected("open"));
        }
        self.inner.open(generation).await
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        self.inner.generations().await
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        self.inner.delete_generation(generation).await
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        self.counters.read_count.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        self.inner.read(generation, key).await
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        self.counters.write_count.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("write"));
        }
        self.inner.write(generation, key, value).await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        self.inner.remove(generation, key).await
    }

    fn label(&self) -> BackendLabel {
        self.inner.label()
    }
}

impl CacheBackend for CountingBackend {}
