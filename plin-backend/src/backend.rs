use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use plin_core::{BackendLabel, GenerationName, Raw, RequestKey, StoredResponse};

use crate::{
    BackendError, DeleteStatus,
    format::{Format, JsonFormat},
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw, generation-scoped blob store.
///
/// Every entry operation names the generation it targets. Writing into a
/// generation that does not exist yet creates it, mirroring how opening a
/// named cache behaves in a browser.
///
/// Implementations must tolerate concurrent reads and writes to different
/// keys. Concurrent writes to the same key may resolve in any order; the last
/// one to land wins.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Creates the generation if it is absent. Opening an existing generation
    /// leaves its entries untouched.
    async fn open(&self, generation: &GenerationName) -> BackendResult<()>;

    /// Names of every generation currently held.
    async fn generations(&self) -> BackendResult<Vec<GenerationName>>;

    /// Drops a generation together with all its entries.
    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus>;

    async fn read(&self, generation: &GenerationName, key: &RequestKey)
    -> BackendResult<Option<Raw>>;

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()>;

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus>;

    /// Returns the label of this backend for logs and metrics.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        (*self).open(generation).await
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        (*self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        (*self).delete_generation(generation).await
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        (*self).read(generation, key).await
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        (*self).write(generation, key, value).await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        (*self).remove(generation, key).await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        (**self).open(generation).await
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        (**self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        (**self).delete_generation(generation).await
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        (**self).read(generation, key).await
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        (**self).write(generation, key, value).await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        (**self).remove(generation, key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        (**self).open(generation).await
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        (**self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        (**self).delete_generation(generation).await
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        (**self).read(generation, key).await
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        (**self).write(generation, key, value).await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        (**self).remove(generation, key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

/// High-level backend trait with typed operations.
///
/// Provides `get` and `set` over [`StoredResponse`] snapshots, handling the
/// encoding through the backend's [`Format`].
pub trait CacheBackend: Backend {
    fn get(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> impl Future<Output = BackendResult<Option<StoredResponse>>> + Send {
        async move {
            match self.read(generation, key).await? {
                Some(raw) => {
                    let value = self.value_format().deserialize(&raw)?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    fn set(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: &StoredResponse,
    ) -> impl Future<Output = BackendResult<()>> + Send {
        async move {
            let raw = self.value_format().serialize(value)?;
            self.write(generation, key, raw).await
        }
    }

    fn delete(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(generation, key).await }
    }
}

// Explicit CacheBackend implementations for trait objects
// These use the default implementations from the trait
impl CacheBackend for &dyn Backend {}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend + Send + 'static> {}
