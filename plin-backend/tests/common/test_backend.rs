//! Simple in-memory test backend implementation using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use plin_backend::format::{BincodeFormat, Format};
use plin_backend::{Backend, BackendResult, CacheBackend, DeleteStatus};
use plin_core::{GenerationName, Raw, RequestKey};
use std::sync::Arc;

type Generation = DashMap<RequestKey, Raw>;

/// Simple in-memory backend for testing using DashMap.
///
/// This backend is thread-safe and can be cloned cheaply (Arc internally).
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<GenerationName, Arc<Generation>>>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key exists in the given generation.
    pub fn has(&self, generation: &GenerationName, key: &RequestKey) -> bool {
        self.store
            .get(generation)
            .is_some_and(|entries| entries.contains_key(key))
    }

    fn generation(&self, generation: &GenerationName) -> Arc<Generation> {
        self.store.entry(generation.clone()).or_default().clone()
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        self.generation(generation);
        Ok(())
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        Ok(self.store.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(generation) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        let Some(entries) = self.store.get(generation).map(|entries| Arc::clone(&entries)) else {
            return Ok(None);
        };
        let value = entries.get(key).map(|raw| raw.clone());
        Ok(value)
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        self.generation(generation).insert(key.clone(), value);
        Ok(())
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        let existed = self
            .store
            .get(generation)
            .is_some_and(|entries| entries.remove(key).is_some());
        Ok(if existed {
            DeleteStatus::Deleted(1)
        } else {
            DeleteStatus::Missing
        })
    }

    fn value_format(&self) -> &dyn Format {
        &BincodeFormat
    }
}

impl CacheBackend for TestBackend {}
