//! # mess-lint-php
//!
//! Tree-sitter based PHP front end for mess-lint.
//!
//! Lowers PHP source into the raw syntax model of `mess-lint-core`
//! ([`SourceUnit`] / [`TypeDecl`]), with type references resolved to
//! fully qualified names:
//!
//! - [`LanguageExtractor`] trait for pluggable front ends
//! - [`PhpExtractor`] for PHP classes, interfaces and traits
//! - [`NameScope`] for namespace and `use` import resolution
//!
//! [`SourceUnit`]: mess_lint_core::ast::SourceUnit
//! [`TypeDecl`]: mess_lint_core::ast::TypeDecl

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod extractor;
pub mod names;
pub mod php;

pub use error::ExtractError;
pub use extractor::LanguageExtractor;
pub use names::NameScope;
pub use php::PhpExtractor;
