//! Top-level configuration file.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use plin::ControllerConfig;
use plin::config::{
    PRODUCTION_BYPASS_HOSTS, PRODUCTION_NETWORK_FIRST, PRODUCTION_PRECACHE, PRODUCTION_PREFIX,
    PRODUCTION_SCOPE, PRODUCTION_VERSION,
};
use plin::offload::TimeoutPolicy;
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfigFile {
    pub generation: Generation,
    pub scope: String,
    #[serde(default)]
    pub precache: Vec<String>,
    #[serde(default)]
    pub bypass: Bypass,
    #[serde(default)]
    pub network_first: Vec<String>,
    #[serde(default)]
    pub offload: Offload,
    #[serde(default)]
    pub backend: Option<Backend>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Generation {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Bypass {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default = "default_schemes")]
    pub schemes: Vec<String>,
}

impl Default for Bypass {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            schemes: default_schemes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Offload {
    /// Upper bound for deferred work. Unbounded when absent.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub on_timeout: OnTimeout,
}

/// What happens to deferred work that outlives `offload.timeout`.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum OnTimeout {
    #[default]
    Cancel,
    Warn,
}

fn default_prefix() -> String {
    PRODUCTION_PREFIX.to_owned()
}

fn default_schemes() -> Vec<String> {
    vec!["http".to_owned(), "https".to_owned()]
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Yaml(error.to_string()))
    }
}

impl ConfigFile {
    /// Reads and parses a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        yaml.parse()
    }

    /// The deployed application's settings, as a file would spell them.
    pub fn production() -> Self {
        Self {
            generation: Generation {
                prefix: PRODUCTION_PREFIX.to_owned(),
                version: PRODUCTION_VERSION.to_owned(),
            },
            scope: PRODUCTION_SCOPE.to_owned(),
            precache: PRODUCTION_PRECACHE.iter().map(|p| p.to_string()).collect(),
            bypass: Bypass {
                hosts: PRODUCTION_BYPASS_HOSTS
                    .iter()
                    .map(|h| h.to_string())
                    .collect(),
                schemes: default_schemes(),
            },
            network_first: PRODUCTION_NETWORK_FIRST
                .iter()
                .map(|p| p.to_string())
                .collect(),
            offload: Offload::default(),
            backend: None,
        }
    }

    /// Validates the file into a controller configuration.
    pub fn into_config(self) -> Result<ControllerConfig, ConfigError> {
        let deferred_timeout = match (self.offload.timeout, self.offload.on_timeout) {
            (None, _) => TimeoutPolicy::Unbounded,
            (Some(timeout), OnTimeout::Cancel) => TimeoutPolicy::Cancel(timeout),
            (Some(timeout), OnTimeout::Warn) => TimeoutPolicy::Warn(timeout),
        };

        let config = ControllerConfig::builder()
            .generation(self.generation.prefix, self.generation.version)
            .scope(self.scope)
            .precache(self.precache)
            .bypass_hosts(self.bypass.hosts)
            .schemes(self.bypass.schemes)
            .network_first(self.network_first)
            .deferred_timeout(deferred_timeout)
            .build()?;
        Ok(config)
    }
}
