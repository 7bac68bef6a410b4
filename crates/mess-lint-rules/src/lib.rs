//! # mess-lint-rules
//!
//! Built-in rules and rule sets for mess-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Set | Description |
//! |------|------|-----|-------------|
//! | ML001 | `ShortMethodName` | naming | Flags method names shorter than a minimum length |
//! | ML002 | `CamelCaseMethodName` | naming | Requires camelCase method names |
//! | ML003 | `TooManyMethods` | design | Limits the number of non-accessor methods per type |
//!
//! Rule names double as the identifiers accepted by
//! `@SuppressWarnings(PHPMD.<Name>)` annotations.
//!
//! ## Usage
//!
//! ```ignore
//! use mess_lint_core::Config;
//! use mess_lint_rules::rule_sets_from_config;
//!
//! let config = Config::from_file("mess-lint.toml".as_ref())?;
//! let rule_sets = rule_sets_from_config(&config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod camel_case_method_name;
mod rule_sets;
mod short_method_name;
mod too_many_methods;

pub use camel_case_method_name::CamelCaseMethodName;
pub use rule_sets::{
    all_rules, rule_set, rule_set_of, rule_sets, rule_sets_from_config, UnknownRuleSet,
    AVAILABLE_RULE_SETS, DESIGN, NAMING,
};
pub use short_method_name::ShortMethodName;
pub use too_many_methods::TooManyMethods;
