//! Accumulates the next cache state.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use mess_lint_core::Violation;

use crate::fingerprint::ConfigFingerprint;
use crate::hash::FingerprintSnapshot;
use crate::state::{CacheState, FileMetadata, FileRecord};

/// Builds the cache state for the current run.
///
/// Starts empty: only files recorded during this run end up in the
/// finalized state, so files that disappeared are pruned.
#[derive(Debug)]
pub struct ResultRecorder {
    snapshot: Arc<FingerprintSnapshot>,
    state: CacheState,
}

impl ResultRecorder {
    /// Creates a recorder for the current configuration.
    ///
    /// Fingerprints are taken from `snapshot`, which should be the one the
    /// change filter decided with.
    #[must_use]
    pub fn new(fingerprint: ConfigFingerprint, snapshot: Arc<FingerprintSnapshot>) -> Self {
        Self {
            snapshot,
            state: CacheState::new(fingerprint),
        }
    }

    /// Records a file's violations, replacing any earlier record for it.
    ///
    /// The file and any dependencies without a fingerprint are fingerprinted
    /// as first observed this run. A file that can't be fingerprinted is not
    /// recorded, so it will be analyzed again next time; unreadable
    /// dependencies are dropped.
    pub fn record(&mut self, path: &Path, violations: Vec<Violation>, metadata: FileMetadata) {
        let key = self.snapshot.key_for(path);
        let Some(fingerprint) = self.snapshot.get(&key) else {
            debug!("Not recording {key}: cannot fingerprint");
            return;
        };

        let mut metadata = metadata;
        let mut unreadable = Vec::new();
        for (dependency, value) in &mut metadata.dependencies {
            if value.is_empty() {
                match self.snapshot.get(dependency) {
                    Some(current) => *value = current,
                    None => unreadable.push(dependency.clone()),
                }
            }
        }
        for dependency in unreadable {
            metadata.dependencies.remove(&dependency);
        }

        self.state
            .files
            .insert(key, FileRecord::new(fingerprint, violations, metadata));
    }

    /// Number of files recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Returns the accumulated state.
    #[must_use]
    pub fn finalize(self) -> CacheState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint_core::{CacheStrategy, Location, Severity};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn recorder(dir: &TempDir) -> ResultRecorder {
        ResultRecorder::new(
            ConfigFingerprint::create(false, &[]),
            Arc::new(FingerprintSnapshot::new(dir.path(), CacheStrategy::Content)),
        )
    }

    fn violation() -> Violation {
        Violation::new(
            "ML002",
            "CamelCaseMethodName",
            Severity::Warning,
            Location::new(PathBuf::from("A.php"), 2, 5),
            "not camel case",
        )
    }

    #[test]
    fn record_fingerprints_file_and_dependencies() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("A.php"), "<?php class A extends B {}").expect("write");
        std::fs::write(dir.path().join("B.php"), "<?php class B {}").expect("write");

        let mut r = recorder(&dir);
        r.record(
            &dir.path().join("A.php"),
            vec![violation()],
            FileMetadata::new().depends_on("B.php").depends_on("Gone.php"),
        );
        let state = r.finalize();

        let record = state.records_for("A.php").expect("recorded");
        assert!(record.fingerprint.starts_with("sha256:"));
        assert_eq!(record.violations, vec![violation()]);
        assert_eq!(
            record.metadata.dependencies.keys().collect::<Vec<_>>(),
            vec!["B.php"]
        );
        assert!(record.metadata.dependencies["B.php"].starts_with("sha256:"));
    }

    #[test]
    fn record_uses_the_fingerprint_observed_before_an_edit() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("A.php");
        std::fs::write(&path, "<?php class A {}").expect("write");
        let snapshot = Arc::new(FingerprintSnapshot::new(dir.path(), CacheStrategy::Content));
        snapshot.observe(&[path.clone()]);
        let observed = snapshot.get("A.php").expect("readable");

        std::fs::write(&path, "<?php class A { function x() {} }").expect("write");
        let mut r = ResultRecorder::new(ConfigFingerprint::create(false, &[]), snapshot);
        r.record(&path, Vec::new(), FileMetadata::new());

        let state = r.finalize();
        assert_eq!(state.records_for("A.php").map(|r| r.fingerprint.clone()), Some(observed));
    }

    #[test]
    fn unreadable_file_is_not_recorded() {
        let dir = TempDir::new().expect("temp dir");
        let mut r = recorder(&dir);
        r.record(&dir.path().join("missing.php"), Vec::new(), FileMetadata::new());
        assert!(r.is_empty());
    }

    #[test]
    fn later_record_overwrites_earlier_one() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("A.php"), "<?php class A {}").expect("write");
        let mut r = recorder(&dir);
        r.record(&dir.path().join("A.php"), vec![violation()], FileMetadata::new());
        r.record(&dir.path().join("A.php"), Vec::new(), FileMetadata::new());

        let state = r.finalize();
        assert_eq!(state.len(), 1);
        assert_eq!(state.violation_count(), 0);
    }
}
