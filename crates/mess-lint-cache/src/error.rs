//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reading is fail-safe and never surfaces these: a cache that can't be
/// read is a cache miss. They are returned when writing the cache or when
/// a file under analysis can't be fingerprinted.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache state could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The temporary file could not be moved over the cache file.
    #[error("failed to replace cache file {path}: {source}")]
    Persist {
        /// The cache file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
