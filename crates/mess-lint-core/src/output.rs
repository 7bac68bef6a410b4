//! Verbosity-gated advisory output.
//!
//! Components that report progress (cache loading, invalidation) receive
//! an [`OutputSink`] explicitly instead of writing to a global logger.
//! Messages are advisory and never change control flow.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, trace};

/// How much advisory output to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Only results.
    Quiet,
    /// Default.
    #[default]
    Normal,
    /// `-v`
    Verbose,
    /// `-vv`
    VeryVerbose,
    /// `-vvv`
    Debug,
}

impl Verbosity {
    /// Maps a repeated `-v` flag count to a verbosity.
    #[must_use]
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Debug,
        }
    }
}

/// Destination for advisory messages.
pub trait OutputSink: Send + Sync {
    /// Writes `message` if the sink's verbosity is at least `verbosity`.
    fn writeln(&self, message: &str, verbosity: Verbosity);
}

/// Forwards messages at or below its threshold to `tracing`.
///
/// `Verbose` messages are logged at debug level, anything chattier at
/// trace level, the rest at info level.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    threshold: Verbosity,
}

impl TracingSink {
    /// Creates a sink that emits messages up to `threshold`.
    #[must_use]
    pub fn new(threshold: Verbosity) -> Self {
        Self { threshold }
    }
}

impl OutputSink for TracingSink {
    fn writeln(&self, message: &str, verbosity: Verbosity) {
        if verbosity > self.threshold {
            return;
        }
        match verbosity {
            Verbosity::Quiet | Verbosity::Normal => info!("{message}"),
            Verbosity::Verbose => debug!("{message}"),
            Verbosity::VeryVerbose | Verbosity::Debug => trace!("{message}"),
        }
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn writeln(&self, _message: &str, _verbosity: Verbosity) {}
}

/// Collects messages in memory, regardless of verbosity.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Verbosity, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected messages in write order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the collected messages with their verbosity.
    #[must_use]
    pub fn entries(&self) -> Vec<(Verbosity, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn writeln(&self, message: &str, verbosity: Verbosity) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((verbosity, message.to_string()));
        }
    }
}
