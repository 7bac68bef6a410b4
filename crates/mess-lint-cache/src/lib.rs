//! # mess-lint-cache
//!
//! Incremental result cache for mess-lint.
//!
//! A run records, per file, the violations produced and a fingerprint of
//! the file. The next run under the same configuration reuses those
//! violations for every file whose fingerprint (and whose ancestors'
//! fingerprints) still match, and analyzes only the rest.
//!
//! - [`ConfigFingerprint`] identifies the configuration a state belongs to
//! - [`CacheStateStore`] loads and atomically saves [`CacheState`]
//! - [`FingerprintSnapshot`] fingerprints each file once per run, before analysis
//! - [`ChangeFilter`] decides per file between reuse and analysis
//! - [`ResultRecorder`] accumulates the next state
//! - [`CacheEngine`] drives a run; [`CacheEngineFactory`] builds one
//!
//! ## Example
//!
//! ```ignore
//! use mess_lint_cache::{CacheEngineFactory, FileAnalysis};
//!
//! let factory = CacheEngineFactory::new(&root, sink);
//! if let Some(engine) = factory.create(&options, &rule_sets) {
//!     let run = engine.process(&files, |path| analyze(path))?;
//!     println!("{} reused, {} analyzed", run.stats.reused, run.stats.analyzed);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod factory;
mod filter;
mod fingerprint;
mod hash;
mod recorder;
mod state;
mod store;

pub use engine::{CacheEngine, CacheRun, CacheStats, FileAnalysis, FileOutcome};
pub use error::CacheError;
pub use factory::CacheEngineFactory;
pub use filter::{relative_key, ChangeFilter, Decision};
pub use fingerprint::ConfigFingerprint;
pub use hash::{fingerprint_file, hash_bytes, FingerprintSnapshot};
pub use recorder::ResultRecorder;
pub use state::{CacheState, FileMetadata, FileRecord, CACHE_FORMAT_VERSION};
pub use store::CacheStateStore;
