//! Per-file reuse decisions.

use std::collections::HashSet;
use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use mess_lint_core::ast::lookup_key;
use mess_lint_core::{CacheStrategy, OutputSink, Verbosity, Violation};

use crate::fingerprint::ConfigFingerprint;
use crate::hash::FingerprintSnapshot;
use crate::state::{CacheState, FileRecord};

/// What to do with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The stored record is still valid; report its violations verbatim.
    Reuse(FileRecord),
    /// Run the rules.
    Analyze,
}

impl Decision {
    /// The carried-forward violations, for [`Decision::Reuse`].
    #[must_use]
    pub fn cached_violations(&self) -> Option<&[Violation]> {
        match self {
            Self::Reuse(record) => Some(&record.violations),
            Self::Analyze => None,
        }
    }

    /// Returns `true` for [`Decision::Analyze`].
    #[must_use]
    pub fn is_analyze(&self) -> bool {
        matches!(self, Self::Analyze)
    }
}

/// Decides, per file, whether a cached result can be reused.
///
/// Read-only over the loaded state and safe to share between threads.
/// Current file fingerprints come from a [`FingerprintSnapshot`], so a base
/// class that many files depend on is only hashed once per run.
pub struct ChangeFilter {
    fingerprint: ConfigFingerprint,
    snapshot: Arc<FingerprintSnapshot>,
    state: Option<CacheState>,
    sink: Arc<dyn OutputSink>,
    drift_reported: AtomicBool,
    declared_types: Option<HashSet<String>>,
}

impl ChangeFilter {
    /// Creates a filter for the current configuration and the loaded state, if any.
    #[must_use]
    pub fn new(
        fingerprint: ConfigFingerprint,
        snapshot: Arc<FingerprintSnapshot>,
        state: Option<CacheState>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            fingerprint,
            snapshot,
            state,
            sink,
            drift_reported: AtomicBool::new(false),
            declared_types: None,
        }
    }

    /// Sets the fully qualified names of every type declared in this run.
    ///
    /// Records that list an unresolved ancestor which is now declared are
    /// analyzed again. Without this, unresolved ancestors aren't checked.
    #[must_use]
    pub fn with_declared_types(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.declared_types = Some(names.into_iter().map(|n| lookup_key(&n)).collect());
        self
    }

    /// The current configuration fingerprint.
    #[must_use]
    pub fn config_fingerprint(&self) -> &ConfigFingerprint {
        &self.fingerprint
    }

    /// The fingerprints of this run.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<FingerprintSnapshot> {
        &self.snapshot
    }

    /// The change detection strategy.
    #[must_use]
    pub fn strategy(&self) -> CacheStrategy {
        self.snapshot.strategy()
    }

    /// The root that cache keys are relative to.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        self.snapshot.base_path()
    }

    /// Cache key for a file: its path relative to the base path, `/`-separated.
    #[must_use]
    pub fn key_for(&self, path: &Path) -> String {
        self.snapshot.key_for(path)
    }

    /// Decides whether `path` must be analyzed.
    ///
    /// The file is fingerprinted first, whatever the outcome, so that a
    /// later record carries the fingerprint of the content that was analyzed.
    ///
    /// 1. No loaded state, or a state from another configuration: analyze.
    /// 2. No record for the file: analyze.
    /// 3. The file's current fingerprint differs from the record's: analyze.
    /// 4. A recorded dependency changed or disappeared: analyze.
    /// 5. An ancestor that didn't resolve before is now declared: analyze.
    /// 6. Otherwise reuse the record.
    #[must_use]
    pub fn decide(&self, path: &Path) -> Decision {
        let key = self.key_for(path);
        let current = self.current_fingerprint(&key);

        let Some(state) = self.usable_state() else {
            return Decision::Analyze;
        };

        let Some(record) = state.records_for(&key) else {
            trace!("{key}: not in cache");
            return Decision::Analyze;
        };

        if current.as_deref() != Some(record.fingerprint.as_str()) {
            debug!("{key}: changed since last run");
            return Decision::Analyze;
        }

        for (dependency, recorded) in &record.metadata.dependencies {
            if self.current_fingerprint(dependency).as_deref() != Some(recorded.as_str()) {
                debug!("{key}: dependency {dependency} changed since last run");
                return Decision::Analyze;
            }
        }

        if let Some(declared) = &self.declared_types {
            if let Some(name) = record
                .metadata
                .unresolved
                .iter()
                .find(|name| declared.contains(&lookup_key(name)))
            {
                debug!("{key}: ancestor {name} is declared now");
                return Decision::Analyze;
            }
        }

        trace!("{key}: reusing {} cached violation(s)", record.violations.len());
        Decision::Reuse(record.clone())
    }

    /// Fingerprint of a file (by cache key) as first seen this run, or `None` if it can't be read.
    #[must_use]
    pub fn current_fingerprint(&self, key: &str) -> Option<String> {
        self.snapshot.get(key)
    }

    fn usable_state(&self) -> Option<&CacheState> {
        let state = self.state.as_ref()?;
        if state.is_compatible(&self.fingerprint) {
            Some(state)
        } else {
            if !self.drift_reported.swap(true, Ordering::Relaxed) {
                self.sink.writeln(
                    "ResultCache is enabled, but the cache metadata doesn't match.",
                    Verbosity::VeryVerbose,
                );
            }
            None
        }
    }
}

/// Path of `path` relative to `base`, joined with `/`.
#[must_use]
pub fn relative_key(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
