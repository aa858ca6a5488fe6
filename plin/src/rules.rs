//! Request classification rules.
//!
//! Routing is evaluated synchronously, before any storage or network work is
//! dispatched, in this order:
//!
//! 1. [`ExclusionSet`] match routes to [`Route::Bypass`]
//! 2. a static-asset [`Destination`](plin_core::Destination) routes to
//!    [`Route::CacheFirst`]
//! 3. an [`ApiPatternSet`] match routes to [`Route::NetworkFirst`]
//! 4. everything else routes to [`Route::StaleWhileRevalidate`]

use regex::Regex;
use smol_str::SmolStr;
use url::Url;

/// Caching strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Straight to the network, no cache interaction at all.
    Bypass,
    /// Serve the stored entry if present, consult the network only on a miss.
    CacheFirst,
    /// Always try the network, fall back to the stored entry on failure.
    NetworkFirst,
    /// Serve the stored entry immediately and refresh it in the background.
    StaleWhileRevalidate,
}

impl Route {
    /// Returns the route as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Route::Bypass => "bypass",
            Route::CacheFirst => "cache_first",
            Route::NetworkFirst => "network_first",
            Route::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }
}

/// Requests that must never read from or write to any generation.
///
/// A URL is excluded when its scheme is not in the allow-list or when its host
/// contains any of the configured host fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    hosts: Vec<SmolStr>,
    schemes: Vec<SmolStr>,
}

impl ExclusionSet {
    /// Creates an exclusion set allowing only `http` and `https`.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            schemes: vec![SmolStr::new_static("http"), SmolStr::new_static("https")],
        }
    }

    /// Replaces the scheme allow-list.
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.schemes = schemes
            .into_iter()
            .map(|scheme| {
                let scheme: SmolStr = scheme.into();
                SmolStr::new(scheme.to_ascii_lowercase())
            })
            .collect();
        self
    }

    /// Host fragments that trigger a bypass.
    pub fn hosts(&self) -> &[SmolStr] {
        &self.hosts
    }

    /// Schemes that may be cached.
    pub fn schemes(&self) -> &[SmolStr] {
        &self.schemes
    }

    /// Whether `url` must bypass the cache.
    pub fn matches(&self, url: &Url) -> bool {
        if !self.schemes.iter().any(|scheme| scheme.as_str() == url.scheme()) {
            return true;
        }
        match url.host_str() {
            Some(host) => self
                .hosts
                .iter()
                .any(|fragment| host.contains(fragment.as_str())),
            None => false,
        }
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(Vec::<SmolStr>::new())
    }
}

/// Regular expressions over the full URL marking network-first endpoints.
#[derive(Debug, Clone, Default)]
pub struct ApiPatternSet {
    patterns: Vec<Regex>,
}

impl ApiPatternSet {
    /// Creates a set from already compiled patterns.
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Compiles every pattern, failing on the first invalid one.
    pub fn parse<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The compiled patterns.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Whether any pattern matches the full URL.
    pub fn matches(&self, url: &Url) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(url.as_str()))
    }
}
