//! Cache-aware processing of a file list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

use mess_lint_core::{OutputSink, Verbosity, Violation};

use crate::filter::{ChangeFilter, Decision};
use crate::recorder::ResultRecorder;
use crate::state::{CacheState, FileMetadata};
use crate::store::CacheStateStore;

/// Result of analyzing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Violations in report order.
    pub violations: Vec<Violation>,
    /// Metadata to store with the record.
    pub metadata: FileMetadata,
}

impl FileAnalysis {
    /// Creates an analysis result.
    #[must_use]
    pub fn new(violations: Vec<Violation>, metadata: FileMetadata) -> Self {
        Self { violations, metadata }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// The file, as passed in.
    pub path: PathBuf,
    /// Violations reported for it.
    pub violations: Vec<Violation>,
    /// `true` if the violations came from the cache.
    pub reused: bool,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Files whose cached violations were reused.
    pub reused: usize,
    /// Files that were analyzed.
    pub analyzed: usize,
    /// Analyzed files that produced no result and were left out of the cache.
    pub skipped: usize,
}

/// Outcome of [`CacheEngine::process`].
#[derive(Debug, Clone, Default)]
pub struct CacheRun {
    /// One outcome per input file, in input order.
    pub outcomes: Vec<FileOutcome>,
    /// Counters.
    pub stats: CacheStats,
    /// `true` if the new state was written.
    pub saved: bool,
}

impl CacheRun {
    /// All violations, in input file order.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.outcomes
            .iter()
            .flat_map(|o| o.violations.iter().cloned())
            .collect()
    }
}

/// Runs analysis only where needed and persists the new state once.
pub struct CacheEngine {
    filter: ChangeFilter,
    recorder: ResultRecorder,
    cache_file: PathBuf,
    sink: Arc<dyn OutputSink>,
}

impl CacheEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(
        filter: ChangeFilter,
        recorder: ResultRecorder,
        cache_file: impl Into<PathBuf>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            filter,
            recorder,
            cache_file: cache_file.into(),
            sink,
        }
    }

    /// Sets the types declared in this run; see [`ChangeFilter::with_declared_types`].
    #[must_use]
    pub fn with_declared_types(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.filter = self.filter.with_declared_types(names);
        self
    }

    /// The change filter.
    #[must_use]
    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }

    /// The file the state is saved to.
    #[must_use]
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Fingerprints `files` as they are now.
    ///
    /// Call this before reading the files for analysis: records made by
    /// [`process`](Self::process) carry these fingerprints, so an edit made
    /// while the run is in progress is picked up by the next run.
    pub fn observe(&self, files: &[PathBuf]) {
        self.filter.snapshot().observe(files);
    }

    /// Processes `files`, calling `analyze` for each file that can't be
    /// served from the cache.
    ///
    /// Every file is fingerprinted before any analysis starts (if
    /// [`observe`](Self::observe) didn't already). `analyze` may run on
    /// several threads at once. Returning `Ok(None)` means the file produced
    /// no result (e.g. it failed to parse); it is reported without
    /// violations and not recorded. Returning `Err` aborts the run before
    /// anything is saved, leaving the previous cache intact.
    ///
    /// A failure to save the new state is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns the first error from `analyze`, in input order.
    pub fn process<F, E>(mut self, files: &[PathBuf], analyze: F) -> Result<CacheRun, E>
    where
        F: Fn(&Path) -> Result<Option<FileAnalysis>, E> + Sync,
        E: Send,
    {
        self.observe(files);

        let filter = &self.filter;
        let decided: Vec<(Decision, Option<Result<Option<FileAnalysis>, E>>)> = files
            .par_iter()
            .map(|path| {
                let decision = filter.decide(path);
                let analysis = decision.is_analyze().then(|| analyze(path));
                (decision, analysis)
            })
            .collect();

        let mut run = CacheRun::default();
        for (path, (decision, analysis)) in files.iter().zip(decided) {
            match (decision, analysis) {
                (Decision::Reuse(record), _) => {
                    run.stats.reused += 1;
                    run.outcomes.push(FileOutcome {
                        path: path.clone(),
                        violations: record.violations.clone(),
                        reused: true,
                    });
                    self.recorder.record(path, record.violations, record.metadata);
                }
                (Decision::Analyze, Some(result)) => {
                    run.stats.analyzed += 1;
                    let Some(analysis) = result? else {
                        debug!("{}: no result, not recorded", path.display());
                        run.stats.skipped += 1;
                        run.outcomes.push(FileOutcome {
                            path: path.clone(),
                            violations: Vec::new(),
                            reused: false,
                        });
                        continue;
                    };
                    run.outcomes.push(FileOutcome {
                        path: path.clone(),
                        violations: analysis.violations.clone(),
                        reused: false,
                    });
                    self.recorder
                        .record(path, analysis.violations, analysis.metadata);
                }
                (Decision::Analyze, None) => {}
            }
        }

        self.sink.writeln(
            &format!(
                "ResultCache reused {} file(s), analyzed {}.",
                run.stats.reused, run.stats.analyzed
            ),
            Verbosity::Verbose,
        );

        let state = self.recorder.finalize();
        run.saved = persist(&self.cache_file, &state);
        Ok(run)
    }
}

fn persist(cache_file: &Path, state: &CacheState) -> bool {
    match CacheStateStore::save(cache_file, state) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write result cache: {e}");
            false
        }
    }
}
