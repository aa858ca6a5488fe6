//! Controller configuration.
//!
//! Everything the controller needs to know about the deployment lives in one
//! [`ControllerConfig`] handed to its constructor: the current generation, the
//! scope, the precache manifest and the routing rules. Nothing is read from
//! globals, so tests can build small configurations next to the production
//! one.

use plin_core::GenerationName;
use regex::Regex;
use smol_str::SmolStr;
use thiserror::Error;
use url::Url;

use crate::offload::TimeoutPolicy;
use crate::rules::{ApiPatternSet, ExclusionSet};

/// Generation prefix used in production.
pub const PRODUCTION_PREFIX: &str = "plin";
/// Generation version used in production. Bumping it invalidates every
/// client's cache on the next activation.
pub const PRODUCTION_VERSION: &str = "1.1.0";
/// Scope the production controller serves.
pub const PRODUCTION_SCOPE: &str = "https://plin.app/";
/// Assets stored at install time.
pub const PRODUCTION_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/css/style.css",
    "/js/app.js",
    "/js/firebase-config.js",
    "/js/trip-wizard.js",
    "/js/timeline.js",
    "/manifest.json",
    "/favicon.ico",
];
/// Hosts that always bypass the cache: realtime database, document store
/// and serverless functions.
pub const PRODUCTION_BYPASS_HOSTS: &[&str] = &[
    "firebaseio.com",
    "firestore.googleapis.com",
    "cloudfunctions.net",
];
/// Third-party APIs served network-first: weather and maps.
pub const PRODUCTION_NETWORK_FIRST: &[&str] = &[
    r"^https://api\.open-meteo\.com/",
    r"^https://maps\.googleapis\.com/",
];

/// Reasons a [`ControllerConfig`] cannot be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The scope is not an absolute base URL.
    #[error("invalid scope {scope:?}: {reason}")]
    InvalidScope {
        /// The rejected scope.
        scope: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A network-first pattern does not compile.
    #[error("invalid network-first pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },

    /// A precache path does not resolve against the scope.
    #[error("invalid precache path {path:?}: {source}")]
    InvalidPrecache {
        /// The rejected path.
        path: String,
        /// Resolution error.
        #[source]
        source: url::ParseError,
    },

    /// The generation prefix is empty.
    #[error("generation prefix must not be empty")]
    EmptyPrefix,

    /// The generation version is empty.
    #[error("generation version must not be empty")]
    EmptyVersion,
}

/// Validated controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    generation: GenerationName,
    scope: Url,
    precache: Vec<Url>,
    exclusions: ExclusionSet,
    api_patterns: ApiPatternSet,
    deferred_timeout: TimeoutPolicy,
}

impl ControllerConfig {
    /// Creates a new builder.
    pub fn builder() -> ControllerConfigBuilder {
        ControllerConfigBuilder::default()
    }

    /// The configuration the deployed application runs with.
    pub fn production() -> Result<Self, ConfigError> {
        Self::builder()
            .generation(PRODUCTION_PREFIX, PRODUCTION_VERSION)
            .scope(PRODUCTION_SCOPE)
            .precache(PRODUCTION_PRECACHE.iter().copied())
            .bypass_hosts(PRODUCTION_BYPASS_HOSTS.iter().copied())
            .network_first(PRODUCTION_NETWORK_FIRST.iter().copied())
            .build()
    }

    /// Name of the current generation.
    pub fn generation(&self) -> &GenerationName {
        &self.generation
    }

    /// Origin and path prefix the controller serves.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Absolute URLs stored at install time, in manifest order.
    pub fn precache(&self) -> &[Url] {
        &self.precache
    }

    /// Requests that never touch the cache.
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Requests served network-first.
    pub fn api_patterns(&self) -> &ApiPatternSet {
        &self.api_patterns
    }

    /// Policy for deferred work.
    pub fn deferred_timeout(&self) -> TimeoutPolicy {
        self.deferred_timeout
    }
}

/// Builder for [`ControllerConfig`].
///
/// Inputs are kept as written and validated together by
/// [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ControllerConfigBuilder {
    prefix: String,
    version: String,
    scope: String,
    precache: Vec<String>,
    bypass_hosts: Vec<SmolStr>,
    schemes: Option<Vec<SmolStr>>,
    network_first: Vec<String>,
    deferred_timeout: TimeoutPolicy,
}

impl Default for ControllerConfigBuilder {
    fn default() -> Self {
        Self {
            prefix: PRODUCTION_PREFIX.to_owned(),
            version: String::new(),
            scope: String::new(),
            precache: Vec::new(),
            bypass_hosts: Vec::new(),
            schemes: None,
            network_first: Vec::new(),
            deferred_timeout: TimeoutPolicy::default(),
        }
    }
}

impl ControllerConfigBuilder {
    /// Sets the generation prefix and version, named `{prefix}-v{version}`.
    pub fn generation(mut self, prefix: impl Into<String>, version: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.version = version.into();
        self
    }

    /// Sets the scope URL.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the precache manifest. Paths resolve against the scope.
    pub fn precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the host fragments that bypass the cache.
    pub fn bypass_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.bypass_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the scheme allow-list (`http` and `https` by default).
    pub fn schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.schemes = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the network-first URL patterns.
    pub fn network_first<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.network_first = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the policy for deferred work.
    pub fn deferred_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.deferred_timeout = policy;
        self
    }

    /// Validates the inputs.
    pub fn build(self) -> Result<ControllerConfig, ConfigError> {
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        let generation = GenerationName::versioned(self.prefix.trim(), self.version.trim());

        let scope = Url::parse(&self.scope).map_err(|error| ConfigError::InvalidScope {
            scope: self.scope.clone(),
            reason: error.to_string(),
        })?;
        if scope.cannot_be_a_base() || scope.host_str().is_none() {
            return Err(ConfigError::InvalidScope {
                scope: self.scope,
                reason: "scope must be a hierarchical URL with a host".to_owned(),
            });
        }

        let precache = self
            .precache
            .into_iter()
            .map(|path| {
                scope
                    .join(&path)
                    .map_err(|source| ConfigError::InvalidPrecache { path, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let patterns = self
            .network_first
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut exclusions = ExclusionSet::new(self.bypass_hosts);
        if let Some(schemes) = self.schemes {
            exclusions = exclusions.with_schemes(schemes);
        }

        Ok(ControllerConfig {
            generation,
            scope,
            precache,
            exclusions,
            api_patterns: ApiPatternSet::new(patterns),
            deferred_timeout: self.deferred_timeout,
        })
    }
}
