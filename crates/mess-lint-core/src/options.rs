//! Per-run options resolved from configuration and command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output::Verbosity;

/// Default cache file name, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = ".mess-lint.cache.json";

/// How the result cache decides whether a file changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Compare a SHA-256 digest of the file bytes.
    #[default]
    Content,
    /// Compare the file's modification time.
    ///
    /// Faster, but unsound: touching a file without editing it forces
    /// re-analysis, and an edit that preserves the timestamp (clock skew,
    /// restored backups, some checkout tools) is missed.
    Timestamp,
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Options for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    cache_enabled: bool,
    strict: bool,
    cache_file: PathBuf,
    cache_strategy: CacheStrategy,
    verbosity: Verbosity,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            strict: false,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            cache_strategy: CacheStrategy::Content,
            verbosity: Verbosity::Normal,
        }
    }
}

impl RunOptions {
    /// Creates options with caching disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes strictness and cache settings from a configuration file.
    ///
    /// A relative cache file is resolved against `working_dir`.
    #[must_use]
    pub fn from_config(config: &Config, working_dir: &Path) -> Self {
        let cache_file = config
            .cache
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
        Self {
            cache_enabled: config.cache.enabled,
            strict: config.strict,
            cache_file: absolutize(&cache_file, working_dir),
            cache_strategy: config.cache.strategy,
            verbosity: Verbosity::Normal,
        }
    }

    /// Enables or disables the result cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Sets strict mode (suppression annotations are ignored).
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the cache file path.
    #[must_use]
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = path.into();
        self
    }

    /// Sets the change detection strategy.
    #[must_use]
    pub fn with_cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.cache_strategy = strategy;
        self
    }

    /// Sets the advisory output verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Whether the result cache is used this run.
    #[must_use]
    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Whether strict mode is on.
    #[must_use]
    pub fn has_strict(&self) -> bool {
        self.strict
    }

    /// Where the cache state is persisted.
    #[must_use]
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// The change detection strategy.
    #[must_use]
    pub fn cache_strategy(&self) -> CacheStrategy {
        self.cache_strategy
    }

    /// Advisory output verbosity.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
