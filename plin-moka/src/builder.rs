//! Builder for configuring [`MokaBackend`].

use moka::future::Cache;
use plin_backend::format::{Format, JsonFormat};
use plin_core::{BackendLabel, Raw, RequestKey};

use crate::backend::MokaBackend;

/// Marker type: capacity has not been configured yet.
///
/// This is the initial state of a [`MokaBackendBuilder`]. You must call either
/// [`max_entries()`](MokaBackendBuilder::max_entries) or
/// [`max_bytes()`](MokaBackendBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity has been configured.
///
/// Each generation holds at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
///
/// Each generation uses at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Capacity applied to every generation cache.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Capacity {
    Entries(u64),
    Bytes(u64),
}

impl Capacity {
    pub(crate) fn build_cache(&self) -> Cache<RequestKey, Raw> {
        match *self {
            Capacity::Entries(n) => Cache::builder().max_capacity(n).build(),
            Capacity::Bytes(n) => Cache::builder()
                .max_capacity(n)
                .weigher(|key: &RequestKey, value: &Raw| -> u32 {
                    (key.memory_size() + value.len())
                        .try_into()
                        .unwrap_or(u32::MAX)
                })
                .build(),
        }
    }
}

/// Builder for creating and configuring a [`MokaBackend`].
///
/// Use [`MokaBackend::builder`] to create a new builder instance.
///
/// # Capacity Configuration (Required)
///
/// You must configure capacity using exactly one of:
/// - [`max_entries(n)`](Self::max_entries) - limit by entry count
/// - [`max_bytes(n)`](Self::max_bytes) - limit by approximate memory usage
///
/// `build()` only exists once capacity is set.
///
/// # Examples
///
/// ```
/// use plin_moka::MokaBackend;
/// use plin_backend::format::BincodeFormat;
///
/// let backend = MokaBackend::builder()
///     .label("offline")
///     .max_bytes(50 * 1024 * 1024)
///     .value_format(BincodeFormat)
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap, S = JsonFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: BackendLabel,
}

impl MokaBackendBuilder<NoCapacity, JsonFormat> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: JsonFormat,
            label: BackendLabel::new_static("moka"),
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity, JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MokaBackendBuilder<NoCapacity, S>
where
    S: Format,
{
    /// Sets the maximum number of entries each generation can hold.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity, S> {
        MokaBackendBuilder {
            capacity: EntryCapacity(capacity),
            serializer: self.serializer,
            label: self.label,
        }
    }

    /// Sets the memory budget in bytes for each generation.
    ///
    /// The weight of an entry is its encoded size plus the key's footprint.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity, S> {
        MokaBackendBuilder {
            capacity: ByteCapacity(bytes),
            serializer: self.serializer,
            label: self.label,
        }
    }
}

impl<Cap, S> MokaBackendBuilder<Cap, S>
where
    S: Format,
{
    /// Sets the backend label used in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the value serialization format.
    pub fn value_format<NewS>(self, serializer: NewS) -> MokaBackendBuilder<Cap, NewS>
    where
        NewS: Format,
    {
        MokaBackendBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
        }
    }
}

impl<S> MokaBackendBuilder<EntryCapacity, S>
where
    S: Format,
{
    /// Builds the backend.
    pub fn build(self) -> MokaBackend<S> {
        MokaBackend::from_parts(Capacity::Entries(self.capacity.0), self.serializer, self.label)
    }
}

impl<S> MokaBackendBuilder<ByteCapacity, S>
where
    S: Format,
{
    /// Builds the backend.
    pub fn build(self) -> MokaBackend<S> {
        MokaBackend::from_parts(Capacity::Bytes(self.capacity.0), self.serializer, self.label)
    }
}
