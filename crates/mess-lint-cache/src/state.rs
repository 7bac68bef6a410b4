//! Persisted cache state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use mess_lint_core::Violation;

use crate::fingerprint::ConfigFingerprint;

/// Version of the on-disk format. A file with another version loads as absent.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Analysis metadata stored alongside a file's violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Files declaring ancestors of this file's types, with their
    /// fingerprints at the time the record was made.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    /// Ancestor type names that didn't resolve to any analyzed file. The
    /// record goes stale once one of them is declared.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unresolved: BTreeSet<String>,

    /// Free-form facts a rule engine wants to keep (e.g. type counts).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl FileMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dependency on another file. The fingerprint is filled in when the record is made.
    #[must_use]
    pub fn depends_on(mut self, path: impl Into<String>) -> Self {
        self.dependencies.insert(path.into(), String::new());
        self
    }

    /// Notes an ancestor type name that couldn't be resolved.
    #[must_use]
    pub fn awaits_type(mut self, fqn: impl Into<String>) -> Self {
        self.unresolved.insert(fqn.into());
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Cached result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Fingerprint of the file when the violations were produced.
    pub fingerprint: String,
    /// Violations in report order.
    pub violations: Vec<Violation>,
    /// Additional analysis metadata.
    #[serde(default)]
    pub metadata: FileMetadata,
}

impl FileRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, violations: Vec<Violation>, metadata: FileMetadata) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            violations,
            metadata,
        }
    }
}

/// Configuration fingerprint plus one record per file, keyed by the path
/// relative to the analysis root (with `/` separators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    /// On-disk format version.
    pub version: u32,
    /// Configuration the records were produced under.
    pub fingerprint: ConfigFingerprint,
    /// Per-file records.
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
}

impl CacheState {
    /// Creates an empty state for a configuration.
    #[must_use]
    pub fn new(fingerprint: ConfigFingerprint) -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            fingerprint,
            files: BTreeMap::new(),
        }
    }

    /// Returns the record for a file, if any.
    #[must_use]
    pub fn records_for(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Returns the state with `record` stored for `path`, replacing any previous record.
    #[must_use]
    pub fn with_record(mut self, path: impl Into<String>, record: FileRecord) -> Self {
        self.files.insert(path.into(), record);
        self
    }

    /// Returns `true` if the state was produced under `fingerprint`.
    #[must_use]
    pub fn is_compatible(&self, fingerprint: &ConfigFingerprint) -> bool {
        self.fingerprint.is_equal_to(fingerprint)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of cached violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.files.values().map(|r| r.violations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint() -> ConfigFingerprint {
        ConfigFingerprint::create(false, &[])
    }

    #[test]
    fn with_record_replaces_wholesale() {
        let state = CacheState::new(fingerprint())
            .with_record(
                "src/A.php",
                FileRecord::new("sha256:1", Vec::new(), FileMetadata::new().property("types", "2")),
            )
            .with_record("src/A.php", FileRecord::new("sha256:2", Vec::new(), FileMetadata::new()));

        let record = state.records_for("src/A.php").expect("recorded");
        assert_eq!(record.fingerprint, "sha256:2");
        assert!(record.metadata.properties.is_empty());
        assert_eq!(state.len(), 1);
        assert!(state.records_for("src/B.php").is_none());
    }

    #[test]
    fn compatibility_follows_fingerprint() {
        let state = CacheState::new(fingerprint());
        assert!(state.is_compatible(&fingerprint()));
        assert!(!state.is_compatible(&ConfigFingerprint::create(true, &[])));
    }

    #[test]
    fn empty_metadata_is_omitted_from_json() {
        let record = FileRecord::new("sha256:1", Vec::new(), FileMetadata::new());
        let json = serde_json::to_string(&record).expect("serializes");
        assert_eq!(json, r#"{"fingerprint":"sha256:1","violations":[],"metadata":{}}"#);
    }
}
