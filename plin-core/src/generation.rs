//! Cache generation names.
//!
//! A generation is a named, versioned collection of stored entries. Bumping the
//! version embedded in the name is the only way to invalidate every stored
//! entry across all clients: on activation every generation whose name differs
//! from the current one is deleted wholesale.
//!
//! ```
//! use plin_core::GenerationName;
//!
//! let current = GenerationName::versioned("plin", "1.1.0");
//! assert_eq!(current.as_str(), "plin-v1.1.0");
//!
//! let old = GenerationName::new("plin-v1.0.0");
//! assert!(old.is_stale(&current));
//! assert!(!current.is_stale(&current));
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Name of a cache generation, e.g. `plin-v1.1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationName(SmolStr);

impl GenerationName {
    /// Wraps an already formatted generation name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// Builds `{prefix}-v{version}`.
    pub fn versioned(prefix: &str, version: &str) -> Self {
        Self(SmolStr::from(format!("{prefix}-v{version}")))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A generation is stale when its name differs from the current one.
    ///
    /// Comparison is by exact name; there is no version ordering, so a
    /// rollback to an older version also invalidates the newer generation.
    #[inline]
    pub fn is_stale(&self, current: &GenerationName) -> bool {
        self != current
    }
}

impl fmt::Display for GenerationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GenerationName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GenerationName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
