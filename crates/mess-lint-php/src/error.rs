//! Error types for source extraction.

use std::path::PathBuf;

/// Errors that can occur while turning source text into a [`SourceUnit`].
///
/// [`SourceUnit`]: mess_lint_core::ast::SourceUnit
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load the {language} grammar: {reason}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Description from the parser.
        reason: String,
    },

    /// The parser returned no tree (cancelled or timed out).
    #[error("{path}: parser produced no syntax tree")]
    NoTree {
        /// File being parsed.
        path: PathBuf,
    },

    /// The source does not parse.
    #[error("{path}:{line}:{column}: syntax error")]
    Syntax {
        /// File being parsed.
        path: PathBuf,
        /// Line of the first error (1-indexed).
        line: usize,
        /// Column of the first error (1-indexed).
        column: usize,
    },
}
