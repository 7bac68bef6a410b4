//! # mess-lint
//!
//! Incremental, inheritance-aware code quality linter for PHP.
//!
//! This is the main facade crate that re-exports core functionality, the
//! result cache, the PHP front end and the built-in rules.
//!
//! ## Suppression Annotations
//!
//! Use `@SuppressWarnings` in a doc comment to silence a rule. Annotations
//! on a parent class, an implemented interface or the overridden method
//! apply to subclasses as well:
//!
//! ```php
//! /**
//!  * @SuppressWarnings(PHPMD.ShortMethodName)
//!  */
//! interface Point
//! {
//!     public function x(): int;
//! }
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use mess_lint::{Analyzer, RunOptions};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .options(RunOptions::new().with_cache(true))
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! println!("{} files, {} reused", result.files_checked, result.files_reused);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};

// Re-export core types and traits
pub use mess_lint_core::*;

/// Incremental result cache.
pub mod cache {
    pub use mess_lint_cache::*;
}

/// PHP front end.
pub mod php {
    pub use mess_lint_php::*;
}

/// Built-in rules and rule sets.
pub mod rules {
    pub use mess_lint_rules::*;
}
