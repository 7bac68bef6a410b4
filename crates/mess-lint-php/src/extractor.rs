//! Language-agnostic extraction trait.
//!
//! `LanguageExtractor` is the extension point for adding front ends.
//! Implement it to lower a language's syntax tree into the raw syntax
//! model of `mess-lint-core`.

use std::path::Path;

use mess_lint_core::ast::SourceUnit;

use crate::error::ExtractError;

/// Trait for language-specific extraction.
///
/// The extractor receives raw source text and returns a [`SourceUnit`]
/// with every class, interface and trait declared in it.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"php"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Extracts the type declarations of one file.
    ///
    /// `path` is recorded on every declaration and used in error messages;
    /// it is normally relative to the analysis root.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse.
    fn extract(&self, path: &Path, source: &str) -> Result<SourceUnit, ExtractError>;

    /// Returns `true` if `path` has one of [`Self::extensions`].
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}
