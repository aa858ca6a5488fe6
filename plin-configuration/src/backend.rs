//! Storage backend section.

use std::sync::Arc;

use plin_backend::Backend as BackendTrait;
use plin_backend::format::{BincodeFormat, Format, JsonFormat};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Backend {
    Moka(Moka),
    FeOxDb(FeOxDb),
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Moka(Moka::default())
    }
}

impl Backend {
    /// Builds the configured backend.
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        match self {
            Backend::Moka(config) => config.into_backend(),
            Backend::FeOxDb(config) => config.into_backend(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    /// Entry limit per generation.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Approximate byte limit per generation.
    #[serde(default)]
    pub max_bytes: Option<u64>,
    /// Optional label for this backend (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: ValueFormat,
}

impl Default for Moka {
    fn default() -> Self {
        Self {
            max_entries: Some(10_000),
            max_bytes: None,
            label: None,
            value: ValueFormat::default(),
        }
    }
}

impl Moka {
    #[cfg(feature = "moka")]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use plin_moka::MokaBackend;

        let mut builder = MokaBackend::builder().value_format(self.value.format.to_serializer());
        if let Some(label) = self.label {
            builder = builder.label(label);
        }

        match (self.max_entries, self.max_bytes) {
            (Some(entries), None) => Ok(Arc::new(builder.max_entries(entries).build())),
            (None, Some(bytes)) => Ok(Arc::new(builder.max_bytes(bytes).build())),
            _ => Err(ConfigError::MokaCapacity),
        }
    }

    #[cfg(not(feature = "moka"))]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Moka".to_string()))
    }
}

/// Persistent store on disk. Without a path it only lives in memory.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeOxDb {
    #[serde(default)]
    pub path: Option<String>,
    /// Upper bound on the store file, in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,
    /// Upper bound on RAM held by the store, in bytes.
    #[serde(default)]
    pub max_memory: Option<usize>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: ValueFormat,
}

impl FeOxDb {
    #[cfg(feature = "feoxdb")]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use plin_feoxdb::FeOxDbBackend;

        let mut builder =
            FeOxDbBackend::builder().value_format(self.value.format.to_serializer());
        if let Some(path) = self.path {
            builder = builder.path(path);
        }
        if let Some(bytes) = self.max_file_size {
            builder = builder.max_file_size(bytes);
        }
        if let Some(bytes) = self.max_memory {
            builder = builder.max_memory(bytes);
        }
        if let Some(label) = self.label {
            builder = builder.label(label);
        }

        let backend = builder.build().map_err(|e| ConfigError::BackendOpen {
            name: "FeOxDb".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "feoxdb"))]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("FeOxDb".to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValueFormat {
    #[serde(default)]
    pub format: ValueSerialization,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ValueSerialization {
    #[default]
    Json,
    Bincode,
}

impl ValueSerialization {
    pub fn to_serializer(&self) -> Box<dyn Format> {
        match self {
            ValueSerialization::Json => Box::new(JsonFormat),
            ValueSerialization::Bincode => Box::new(BincodeFormat),
        }
    }
}
