//! Moka backend implementation.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use plin_backend::format::{Format, JsonFormat};
use plin_backend::{Backend, BackendResult, DeleteStatus};
use plin_core::{BackendLabel, GenerationName, Raw, RequestKey};
use tracing::debug;

use crate::builder::{Capacity, MokaBackendBuilder, NoCapacity};

/// In-memory generation store powered by Moka.
///
/// `MokaBackend` keeps one concurrent Moka cache per generation. Reads are
/// lock-free and writes use fine-grained locking, so request handlers hitting
/// different keys never wait on each other. Two writes to the same key race and
/// the last one wins.
///
/// # Type Parameters
///
/// * `S` - Serialization format for stored entries. Implements [`Format`].
///   Default: [`JsonFormat`].
///
/// # Caveats
///
/// - Data is **not persisted**: every generation is lost on process restart
/// - Capacity applies **per generation**
/// - Eviction is **best-effort**: Moka enforces capacity in the background,
///   briefly exceeding it is possible until pending tasks run
///
/// Cloning is cheap; clones share the same generations.
#[derive(Clone)]
pub struct MokaBackend<S = JsonFormat>
where
    S: Format,
{
    generations: Arc<DashMap<GenerationName, Cache<RequestKey, Raw>>>,
    capacity: Capacity,
    serializer: S,
    label: BackendLabel,
}

impl<S> std::fmt::Debug for MokaBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("generations", &self.generations.len())
            .field("capacity", &self.capacity)
            .field("serializer", &std::any::type_name::<S>())
            .finish()
    }
}

impl MokaBackend<JsonFormat> {
    /// Creates a new builder for `MokaBackend`.
    ///
    /// Capacity must be configured with
    /// [`max_entries`](MokaBackendBuilder::max_entries) or
    /// [`max_bytes`](MokaBackendBuilder::max_bytes) before building.
    pub fn builder() -> MokaBackendBuilder<NoCapacity, JsonFormat> {
        MokaBackendBuilder::new()
    }
}

impl<S> MokaBackend<S>
where
    S: Format,
{
    pub(crate) fn from_parts(capacity: Capacity, serializer: S, label: BackendLabel) -> Self {
        Self {
            generations: Arc::new(DashMap::new()),
            capacity,
            serializer,
            label,
        }
    }

    /// Returns the Moka cache backing `generation`, if it exists.
    ///
    /// Useful in tests to force pending maintenance with
    /// `run_pending_tasks().await`.
    pub fn generation_cache(&self, generation: &GenerationName) -> Option<Cache<RequestKey, Raw>> {
        self.generations.get(generation).map(|cache| cache.clone())
    }

    /// Number of entries held by `generation`, zero if it does not exist.
    pub fn entry_count(&self, generation: &GenerationName) -> u64 {
        self.generation_cache(generation)
            .map_or(0, |cache| cache.entry_count())
    }

    fn open_cache(&self, generation: &GenerationName) -> Cache<RequestKey, Raw> {
        self.generations
            .entry(generation.clone())
            .or_insert_with(|| {
                debug!(backend = %self.label, %generation, "creating generation");
                self.capacity.build_cache()
            })
            .clone()
    }
}

#[async_trait]
impl<S> Backend for MokaBackend<S>
where
    S: Format + Send + Sync,
{
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        self.open_cache(generation);
        Ok(())
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        let mut names: Vec<_> = self
            .generations
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        match self.generations.remove(generation) {
            Some((_, cache)) => {
                cache.invalidate_all();
                Ok(DeleteStatus::Deleted(1))
            }
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        match self.generation_cache(generation) {
            Some(cache) => Ok(cache.get(key).await),
            None => Ok(None),
        }
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        self.open_cache(generation).insert(key.clone(), value).await;
        Ok(())
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        let removed = match self.generation_cache(generation) {
            Some(cache) => cache.remove(key).await,
            None => None,
        };
        match removed {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}

// Explicit CacheBackend implementation using default trait methods
impl<S> plin_backend::CacheBackend for MokaBackend<S> where S: Format + Send + Sync {}
