//! # mess-lint-core
//!
//! Core framework for mess-lint.
//!
//! This crate provides the foundational types shared by every other
//! mess-lint crate:
//!
//! - [`ast`]: the raw syntax model produced by language front ends
//! - [`node`]: the inheritance-aware node model rules are evaluated against
//! - [`Rule`] and [`RuleSet`] for defining rules
//! - [`Violation`] and [`LintResult`] for representing findings
//! - [`Config`] and [`RunOptions`] for configuration
//! - [`OutputSink`] for verbosity-gated advisory messages
//!
//! ## Example
//!
//! ```ignore
//! use mess_lint_core::ast::Codebase;
//! use mess_lint_core::node::TypeNode;
//!
//! let codebase = Codebase::from_types(units.into_iter().flat_map(|u| u.types));
//! for decl in codebase.iter() {
//!     let ty = TypeNode::new(decl, &codebase);
//!     for method in ty.methods() {
//!         if method.is_declaration() && !method.has_suppression_for("ShortMethodName") {
//!             println!("{}", method.fully_qualified_name());
//!         }
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
mod config;
mod context;
pub mod node;
mod options;
mod output;
mod rule;
mod types;

pub use config::{AnalyzerConfig, CacheConfig, Config, ConfigError, RuleConfig, DEFAULT_RULE_SETS};
pub use context::FileContext;
pub use node::{
    Capability, CapabilityValue, HierarchyResolver, MethodNode, NodeError, SyntaxNode, TypeNode,
};
pub use options::{CacheStrategy, RunOptions, DEFAULT_CACHE_FILE};
pub use output::{MemorySink, NullSink, OutputSink, TracingSink, Verbosity};
pub use rule::{Rule, RuleBox, RuleEntry, RuleSet};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
