//! Builds a [`CacheEngine`] for a run, or decides not to.

use std::path::PathBuf;
use std::sync::Arc;

use mess_lint_core::{OutputSink, RuleSet, RunOptions, Verbosity};

use crate::engine::CacheEngine;
use crate::filter::ChangeFilter;
use crate::fingerprint::ConfigFingerprint;
use crate::hash::FingerprintSnapshot;
use crate::recorder::ResultRecorder;
use crate::store::CacheStateStore;

/// Wires fingerprint, loaded state, filter and recorder together.
pub struct CacheEngineFactory {
    base_path: PathBuf,
    sink: Arc<dyn OutputSink>,
}

impl CacheEngineFactory {
    /// Creates a factory. Cache keys will be relative to `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            base_path: base_path.into(),
            sink,
        }
    }

    /// Returns an engine, or `None` when caching is disabled.
    ///
    /// A missing, unreadable, or incompatible cache file still yields an
    /// engine; it just starts from an empty state.
    #[must_use]
    pub fn create(&self, options: &RunOptions, rule_sets: &[RuleSet]) -> Option<CacheEngine> {
        if !options.is_cache_enabled() {
            self.sink
                .writeln("ResultCache is not enabled.", Verbosity::VeryVerbose);
            return None;
        }

        let fingerprint = ConfigFingerprint::create(options.has_strict(), rule_sets);
        let cache_file = options.cache_file();
        let state = match CacheStateStore::load(cache_file) {
            None => {
                self.sink.writeln(
                    "ResultCache is enabled, but no prior cache-result file exists.",
                    Verbosity::VeryVerbose,
                );
                None
            }
            Some(state) if !state.is_compatible(&fingerprint) => {
                self.sink.writeln(
                    "ResultCache is enabled, but the cache metadata doesn't match.",
                    Verbosity::VeryVerbose,
                );
                None
            }
            Some(state) => {
                self.sink.writeln(
                    &format!("ResultCache is enabled, and read from {}", cache_file.display()),
                    Verbosity::VeryVerbose,
                );
                Some(state)
            }
        };

        let snapshot = Arc::new(FingerprintSnapshot::new(
            self.base_path.clone(),
            options.cache_strategy(),
        ));
        let filter = ChangeFilter::new(
            fingerprint.clone(),
            Arc::clone(&snapshot),
            state,
            Arc::clone(&self.sink),
        );
        let recorder = ResultRecorder::new(fingerprint, snapshot);
        Some(CacheEngine::new(
            filter,
            recorder,
            cache_file,
            Arc::clone(&self.sink),
        ))
    }
}
