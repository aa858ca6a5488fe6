use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error(transparent)]
    Invalid(#[from] plin::ConfigError),

    #[error("backend {0} is not available, enable its feature")]
    BackendNotAvailable(String),

    #[error("moka backend needs exactly one of max_entries or max_bytes")]
    MokaCapacity,

    #[error("failed to open backend {name}: {reason}")]
    BackendOpen { name: String, reason: String },
}
