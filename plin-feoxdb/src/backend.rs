use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use bincode::{
    config::standard as bincode_config,
    serde::{decode_from_slice, encode_to_vec},
};
use bytes::Bytes;
use feoxdb::{FeoxError, FeoxStore};
use plin_backend::format::{Format, JsonFormat};
use plin_backend::{Backend, BackendResult, DeleteStatus};
use plin_core::{BackendLabel, GenerationName, Raw, RequestKey};
use tracing::debug;

use crate::FeOxDbError;

/// Index key listing every generation.
const GENERATIONS: &[u8] = b"\0generations";

fn keys_of(generation: &str) -> Vec<u8> {
    format!("\0keys\0{generation}").into_bytes()
}

fn entry_of(generation: &str, key: &str) -> Vec<u8> {
    format!("{generation}\0{key}").into_bytes()
}

fn load_list(store: &FeoxStore, index: &[u8]) -> Result<Vec<String>, FeOxDbError> {
    match store.get(index) {
        Ok(encoded) => Ok(decode_from_slice(&encoded, bincode_config())?.0),
        Err(FeoxError::KeyNotFound) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_list(store: &FeoxStore, index: &[u8], list: &[String]) -> Result<(), FeOxDbError> {
    let encoded = encode_to_vec(list, bincode_config())?;
    store.insert(index, &encoded)?;
    Ok(())
}

/// Records `generation` in the index. Returns whether it was new.
fn ensure_generation(store: &FeoxStore, generation: &str) -> Result<bool, FeOxDbError> {
    let mut names = load_list(store, GENERATIONS)?;
    if names.iter().any(|name| name == generation) {
        return Ok(false);
    }
    names.push(generation.to_string());
    names.sort();
    save_list(store, GENERATIONS, &names)?;
    Ok(true)
}

/// Disk-based generation store using FeOxDB.
///
/// Use this when installed generations must survive restarts. For a
/// process-local store, prefer `MokaBackend`.
///
/// ```no_run
/// use plin_feoxdb::FeOxDbBackend;
///
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/plin")
///     .max_file_size(512 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), plin_feoxdb::FeOxDbError>(())
/// ```
///
/// Reads go straight to the store. Writes, removals and generation changes
/// also update the index and are serialized against each other.
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct FeOxDbBackend<S = JsonFormat>
where
    S: Format,
{
    store: Arc<FeoxStore>,
    index_lock: Arc<Mutex<()>>,
    serializer: S,
    label: BackendLabel,
}

impl<S> std::fmt::Debug for FeOxDbBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeOxDbBackend")
            .field("label", &self.label)
            .field("serializer", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S> FeOxDbBackend<S>
where
    S: Format,
{
    /// Forces pending writes to disk.
    ///
    /// FeOxDB buffers writes and flushes them periodically. No-op in
    /// memory-only mode.
    pub fn flush(&self) {
        self.store.flush();
    }

    /// Runs `op` on a blocking thread while holding the index lock.
    async fn locked<T, F>(&self, op: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&FeoxStore) -> Result<T, FeOxDbError> + Send + 'static,
    {
        let store = self.store.clone();
        let index_lock = self.index_lock.clone();
        let result = tokio::task::spawn_blocking(move || {
            let _guard = index_lock.lock().unwrap_or_else(PoisonError::into_inner);
            op(&store)
        })
        .await
        .map_err(FeOxDbError::from)?;
        Ok(result?)
    }
}

impl FeOxDbBackend<JsonFormat> {
    /// Starts building a new backend.
    pub fn builder() -> FeOxDbBackendBuilder<JsonFormat> {
        FeOxDbBackendBuilder::default()
    }

    /// Memory-only backend, lost when dropped. Equivalent to
    /// `builder().build()`.
    pub fn in_memory() -> Result<Self, FeOxDbError> {
        Self::builder().build()
    }
}

/// Builder for [`FeOxDbBackend`].
///
/// ```no_run
/// use plin_feoxdb::FeOxDbBackend;
/// use plin_backend::format::BincodeFormat;
///
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/plin")
///     .max_memory(64 * 1024 * 1024)
///     .label("offline")
///     .value_format(BincodeFormat)
///     .build()?;
/// # Ok::<(), plin_feoxdb::FeOxDbError>(())
/// ```
pub struct FeOxDbBackendBuilder<S = JsonFormat>
where
    S: Format,
{
    path: Option<PathBuf>,
    max_file_size: Option<u64>,
    max_memory: Option<usize>,
    serializer: S,
    label: BackendLabel,
}

impl Default for FeOxDbBackendBuilder<JsonFormat> {
    fn default() -> Self {
        Self {
            path: None,
            max_file_size: None,
            max_memory: None,
            serializer: JsonFormat,
            label: BackendLabel::new_static("feoxdb"),
        }
    }
}

impl<S> FeOxDbBackendBuilder<S>
where
    S: Format,
{
    /// Enables persistent storage at the given path.
    ///
    /// Without this, data lives only in memory and is lost on restart.
    /// If path is a directory, creates `plin.db` inside it.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Pre-allocates disk space and caps maximum storage. Writes fail once
    /// the file is full. Ignored in memory-only mode.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Limits RAM usage. FeOxDB never evicts: writes fail once the limit is
    /// reached.
    pub fn max_memory(mut self, bytes: usize) -> Self {
        self.max_memory = Some(bytes);
        self
    }

    /// Sets the backend label used in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the value serialization format.
    pub fn value_format<NewS>(self, serializer: NewS) -> FeOxDbBackendBuilder<NewS>
    where
        NewS: Format,
    {
        FeOxDbBackendBuilder {
            path: self.path,
            max_file_size: self.max_file_size,
            max_memory: self.max_memory,
            serializer,
            label: self.label,
        }
    }

    /// Opens or creates the store.
    pub fn build(self) -> Result<FeOxDbBackend<S>, FeOxDbError> {
        let mut builder = FeoxStore::builder();

        if let Some(mut path) = self.path {
            if path.is_dir() {
                path.push("plin.db");
            }
            builder = builder.device_path(path.to_string_lossy().to_string());
        }

        if let Some(file_size) = self.max_file_size {
            builder = builder.file_size(file_size);
        }

        if let Some(memory) = self.max_memory {
            builder = builder.max_memory(memory);
        }

        Ok(FeOxDbBackend {
            store: Arc::new(builder.build()?),
            index_lock: Arc::new(Mutex::new(())),
            serializer: self.serializer,
            label: self.label,
        })
    }
}

#[async_trait]
impl<S> Backend for FeOxDbBackend<S>
where
    S: Format + Send + Sync,
{
    async fn open(&self, generation: &GenerationName) -> BackendResult<()> {
        let name = generation.to_string();
        let label = self.label.clone();
        self.locked(move |store| {
            if ensure_generation(store, &name)? {
                debug!(backend = %label, generation = %name, "creating generation");
            }
            Ok(())
        })
        .await
    }

    async fn generations(&self) -> BackendResult<Vec<GenerationName>> {
        let names = self.locked(|store| load_list(store, GENERATIONS)).await?;
        Ok(names.into_iter().map(GenerationName::from).collect())
    }

    async fn delete_generation(&self, generation: &GenerationName) -> BackendResult<DeleteStatus> {
        let name = generation.to_string();
        self.locked(move |store| {
            let mut names = load_list(store, GENERATIONS)?;
            let Some(position) = names.iter().position(|n| *n == name) else {
                return Ok(DeleteStatus::Missing);
            };

            let index = keys_of(&name);
            for key in load_list(store, &index)? {
                let entry = entry_of(&name, &key);
                if store.contains_key(&entry) {
                    store.delete(&entry)?;
                }
            }
            if store.contains_key(&index) {
                store.delete(&index)?;
            }

            names.remove(position);
            save_list(store, GENERATIONS, &names)?;
            Ok(DeleteStatus::Deleted(1))
        })
        .await
    }

    async fn read(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<Option<Raw>> {
        let store = self.store.clone();
        let entry = entry_of(generation.as_str(), &key.to_string());

        let read = tokio::task::spawn_blocking(move || match store.get(&entry) {
            Ok(value) => Ok(Some(Bytes::from(value))),
            Err(FeoxError::KeyNotFound) => Ok(None),
            Err(e) => Err(FeOxDbError::from(e)),
        })
        .await
        .map_err(FeOxDbError::from)?;
        Ok(read?)
    }

    async fn write(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
        value: Raw,
    ) -> BackendResult<()> {
        let name = generation.to_string();
        let key = key.to_string();
        self.locked(move |store| {
            ensure_generation(store, &name)?;
            let entry = entry_of(&name, &key);
            let known = store.contains_key(&entry);
            store.insert(&entry, &value)?;
            if !known {
                let index = keys_of(&name);
                let mut keys = load_list(store, &index)?;
                keys.push(key);
                save_list(store, &index, &keys)?;
            }
            Ok(())
        })
        .await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &RequestKey,
    ) -> BackendResult<DeleteStatus> {
        let name = generation.to_string();
        let key = key.to_string();
        self.locked(move |store| {
            let entry = entry_of(&name, &key);
            if !store.contains_key(&entry) {
                return Ok(DeleteStatus::Missing);
            }
            store.delete(&entry)?;

            let index = keys_of(&name);
            let mut keys = load_list(store, &index)?;
            keys.retain(|k| *k != key);
            save_list(store, &index, &keys)?;
            Ok(DeleteStatus::Deleted(1))
        })
        .await
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}

// Explicit CacheBackend implementation using default trait methods
impl<S> plin_backend::CacheBackend for FeOxDbBackend<S> where S: Format + Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_keys_are_scoped_by_generation() {
        let old = entry_of("plin-v1.0.0", "GET https://plin.app/");
        let new = entry_of("plin-v1.1.0", "GET https://plin.app/");
        assert_ne!(old, new);
        assert!(old.starts_with(b"plin-v1.0.0\0"));
    }

    #[test]
    fn index_keys_cannot_collide_with_entries() {
        assert_eq!(keys_of("plin-v1.1.0").first(), Some(&0));
        assert_eq!(GENERATIONS.first(), Some(&0));
    }

    #[tokio::test]
    async fn builder_sets_label() {
        let backend = FeOxDbBackend::builder().label("offline").build().unwrap();
        assert_eq!(backend.label().as_str(), "offline");
    }
}
