//! Per-file fingerprints.

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::UNIX_EPOCH;
use tracing::debug;

use mess_lint_core::CacheStrategy;

use crate::error::CacheError;
use crate::filter::relative_key;

/// Computes the SHA-256 hash of a byte slice as lowercase hex.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let hasher = Sha256::new();
    let hash = hasher.chain_update(bytes).finalize();
    format!("{hash:x}")
}

/// Fingerprints a file with the given strategy.
///
/// Fingerprints carry a strategy prefix (`sha256:` or `mtime:`) so values
/// produced under different strategies never compare equal.
///
/// # Errors
///
/// Returns an error if the file or its metadata cannot be read.
pub fn fingerprint_file(path: &Path, strategy: CacheStrategy) -> Result<String, CacheError> {
    let io_error = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    match strategy {
        CacheStrategy::Content => {
            let content = fs::read(path).map_err(io_error)?;
            Ok(format!("sha256:{}", hash_bytes(&content)))
        }
        CacheStrategy::Timestamp => {
            let metadata = fs::metadata(path).map_err(io_error)?;
            let modified = metadata.modified().map_err(io_error)?;
            let since_epoch = modified.duration_since(UNIX_EPOCH).unwrap_or_default();
            Ok(format!(
                "mtime:{}.{:09}:{}",
                since_epoch.as_secs(),
                since_epoch.subsec_nanos(),
                metadata.len()
            ))
        }
    }
}

/// Fingerprints of the files under a base path, each taken at most once per run.
///
/// The first observation of a file is kept for the rest of the run. Taking
/// it before the file is read for analysis means a record never carries a
/// fingerprint newer than the content its violations came from.
#[derive(Debug)]
pub struct FingerprintSnapshot {
    base_path: PathBuf,
    strategy: CacheStrategy,
    taken: Mutex<HashMap<String, Option<String>>>,
}

impl FingerprintSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, strategy: CacheStrategy) -> Self {
        Self {
            base_path: base_path.into(),
            strategy,
            taken: Mutex::new(HashMap::new()),
        }
    }

    /// The root that cache keys are relative to.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The change detection strategy.
    #[must_use]
    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    /// Cache key for a file: its path relative to the base path, `/`-separated.
    #[must_use]
    pub fn key_for(&self, path: &Path) -> String {
        relative_key(&self.base_path, path)
    }

    /// Fingerprints every file in `files` that hasn't been observed yet.
    pub fn observe(&self, files: &[PathBuf]) {
        files.par_iter().for_each(|path| {
            let _ = self.get(&self.key_for(path));
        });
    }

    /// Fingerprint of a file (by cache key) as first observed this run, or
    /// `None` if it couldn't be read.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        if let Ok(taken) = self.taken.lock() {
            if let Some(known) = taken.get(key) {
                return known.clone();
            }
        }

        let computed = match fingerprint_file(&self.base_path.join(key), self.strategy) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!("Cannot fingerprint {key}: {e}");
                None
            }
        };

        match self.taken.lock() {
            Ok(mut taken) => taken.entry(key.to_string()).or_insert(computed).clone(),
            Err(_) => computed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn hash_bytes_is_sha256_hex() {
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn content_fingerprint_follows_bytes() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"<?php class A {}").expect("write");
        let first = fingerprint_file(file.path(), CacheStrategy::Content).expect("fingerprint");
        assert!(first.starts_with("sha256:"));
        assert_eq!(
            first,
            fingerprint_file(file.path(), CacheStrategy::Content).expect("fingerprint")
        );

        file.write_all(b"\n").expect("write");
        assert_ne!(
            first,
            fingerprint_file(file.path(), CacheStrategy::Content).expect("fingerprint")
        );
    }

    #[test]
    fn strategies_never_collide() {
        let file = NamedTempFile::new().expect("temp file");
        let content = fingerprint_file(file.path(), CacheStrategy::Content).expect("fingerprint");
        let mtime = fingerprint_file(file.path(), CacheStrategy::Timestamp).expect("fingerprint");
        assert!(mtime.starts_with("mtime:"));
        assert_ne!(content, mtime);
    }

    #[test]
    fn snapshot_keeps_the_first_observation() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("A.php");
        std::fs::write(&path, "<?php class A {}").expect("write");

        let snapshot = FingerprintSnapshot::new(dir.path(), CacheStrategy::Content);
        snapshot.observe(&[path.clone()]);
        let before = snapshot.get("A.php").expect("readable");

        std::fs::write(&path, "<?php class A { function x() {} }").expect("write");
        assert_eq!(snapshot.get("A.php"), Some(before.clone()));
        assert_ne!(
            fingerprint_file(&path, CacheStrategy::Content).expect("fingerprint"),
            before
        );
        assert_eq!(snapshot.get("missing.php"), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = fingerprint_file(Path::new("/nonexistent/x.php"), CacheStrategy::Content)
            .expect_err("missing");
        assert!(matches!(err, CacheError::Io { .. }));
    }
}
