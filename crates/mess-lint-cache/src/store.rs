//! Loading and saving the cache file.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CacheError;
use crate::state::{CacheState, CACHE_FORMAT_VERSION};

/// Reads and writes [`CacheState`] as JSON.
pub struct CacheStateStore;

impl CacheStateStore {
    /// Loads a cache state, returning `None` if the file doesn't exist,
    /// can't be read, can't be parsed, or was written in another format version.
    ///
    /// This is fail-safe: any problem is a cache miss.
    #[must_use]
    pub fn load(path: &Path) -> Option<CacheState> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable cache at {}: {e}", path.display());
                return None;
            }
        };
        let state: CacheState = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                debug!("Ignoring corrupt cache at {}: {e}", path.display());
                return None;
            }
        };
        if state.version != CACHE_FORMAT_VERSION {
            debug!(
                "Ignoring cache at {} with format version {} (expected {})",
                path.display(),
                state.version,
                CACHE_FORMAT_VERSION
            );
            return None;
        }
        Some(state)
    }

    /// Saves a cache state atomically.
    ///
    /// The state is written to a temporary file in the target directory and
    /// renamed over `path`, so readers see either the old or the new file.
    /// Creates the target directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, temporary file, or rename fails.
    pub fn save(path: &Path, state: &CacheState) -> Result<(), CacheError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let json = serde_json::to_vec(state).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

        let io_error = |source| CacheError::Io {
            path: dir.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        tmp.write_all(&json).map_err(io_error)?;
        tmp.as_file().sync_all().map_err(io_error)?;
        tmp.persist(path).map_err(|e| CacheError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        debug!(
            "Wrote cache with {} record(s) to {}",
            state.len(),
            path.display()
        );
        Ok(())
    }

    /// Deletes the cache file. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be removed.
    pub fn clear(path: &Path) -> Result<bool, CacheError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::ConfigFingerprint;
    use crate::state::{FileMetadata, FileRecord};
    use mess_lint_core::{Location, Severity, Violation};
    use tempfile::TempDir;

    fn sample_state() -> CacheState {
        let violation = Violation::new(
            "ML001",
            "ShortMethodName",
            Severity::Warning,
            Location::new(PathBuf::from("src/A.php"), 4, 21),
            "too short",
        );
        CacheState::new(ConfigFingerprint::create(false, &[])).with_record(
            "src/A.php",
            FileRecord::new(
                "sha256:abc",
                vec![violation],
                FileMetadata::new().depends_on("src/Base.php"),
            ),
        )
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested/cache.json");

        CacheStateStore::save(&path, &sample_state()).expect("save");
        let loaded = CacheStateStore::load(&path).expect("load");
        assert_eq!(loaded, sample_state());
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        assert!(CacheStateStore::load(&dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{\"version\": 1, \"fingerprint\": ").expect("write");
        assert!(CacheStateStore::load(&path).is_none());
    }

    #[test]
    fn other_format_version_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        let mut state = sample_state();
        state.version = CACHE_FORMAT_VERSION + 1;
        CacheStateStore::save(&path, &state).expect("save");
        assert!(CacheStateStore::load(&path).is_none());
    }

    #[test]
    fn save_replaces_existing_file_without_leftovers() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "old").expect("write");

        CacheStateStore::save(&path, &sample_state()).expect("save");
        assert!(CacheStateStore::load(&path).is_some());

        let entries = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(entries, 1, "temporary file should be renamed away");
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = TempDir::new().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").expect("write");

        let err = CacheStateStore::save(&blocker.join("cache.json"), &sample_state())
            .expect_err("parent is a file");
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn clear_reports_whether_a_file_was_removed() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache.json");
        CacheStateStore::save(&path, &sample_state()).expect("save");

        assert!(CacheStateStore::clear(&path).expect("clear"));
        assert!(!CacheStateStore::clear(&path).expect("clear again"));
    }
}
