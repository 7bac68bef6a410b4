//! Named rule sets built from configuration.

use mess_lint_core::{Config, RuleBox, RuleConfig, RuleSet};
use tracing::debug;

use crate::{CamelCaseMethodName, ShortMethodName, TooManyMethods};

/// Naming conventions (`ShortMethodName`, `CamelCaseMethodName`).
pub const NAMING: &str = "naming";

/// Design limits (`TooManyMethods`).
pub const DESIGN: &str = "design";

/// Names accepted by [`rule_set`].
pub const AVAILABLE_RULE_SETS: &[&str] = &[NAMING, DESIGN];

/// A rule set name that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule set `{name}` (available: {})", AVAILABLE_RULE_SETS.join(", "))]
pub struct UnknownRuleSet {
    /// The requested name.
    pub name: String,
}

/// Builds one rule set, applying per-rule options, severity overrides and
/// `enabled = false` from `config`.
///
/// # Errors
///
/// Returns an error if `name` is not one of [`AVAILABLE_RULE_SETS`].
pub fn rule_set(name: &str, config: &Config) -> Result<RuleSet, UnknownRuleSet> {
    let rules: Vec<RuleBox> = match name.trim().to_lowercase().as_str() {
        NAMING => vec![
            Box::new(short_method_name(config.rule(crate::short_method_name::NAME))),
            Box::new(camel_case_method_name(
                config.rule(crate::camel_case_method_name::NAME),
            )),
        ],
        DESIGN => vec![Box::new(too_many_methods(
            config.rule(crate::too_many_methods::NAME),
        ))],
        _ => {
            return Err(UnknownRuleSet {
                name: name.to_string(),
            })
        }
    };

    let mut set = RuleSet::new(name.trim().to_lowercase());
    for rule in rules {
        if !config.is_rule_enabled(rule.name()) {
            debug!("Rule {} disabled by configuration", rule.name());
            continue;
        }
        let severity = config
            .rule_severity(rule.name())
            .unwrap_or_else(|| rule.default_severity());
        set.push(rule, severity);
    }
    Ok(set)
}

/// Builds the rule sets named in `config` (or the defaults).
///
/// # Errors
///
/// Returns an error for the first unknown rule set name.
pub fn rule_sets_from_config(config: &Config) -> Result<Vec<RuleSet>, UnknownRuleSet> {
    rule_sets(&config.rule_set_names(), config)
}

/// Builds the given rule sets. Duplicate names are built once.
///
/// # Errors
///
/// Returns an error for the first unknown rule set name.
pub fn rule_sets(names: &[String], config: &Config) -> Result<Vec<RuleSet>, UnknownRuleSet> {
    let mut sets: Vec<RuleSet> = Vec::new();
    for name in names {
        let set = rule_set(name, config)?;
        if sets.iter().all(|s| s.name() != set.name()) {
            sets.push(set);
        }
    }
    Ok(sets)
}

/// Returns every built-in rule with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(ShortMethodName::new()),
        Box::new(CamelCaseMethodName::new()),
        Box::new(TooManyMethods::new()),
    ]
}

/// The rule set a built-in rule belongs to.
#[must_use]
pub fn rule_set_of(rule_name: &str) -> Option<&'static str> {
    match rule_name {
        crate::short_method_name::NAME | crate::camel_case_method_name::NAME => Some(NAMING),
        crate::too_many_methods::NAME => Some(DESIGN),
        _ => None,
    }
}

fn usize_option(config: Option<&RuleConfig>, key: &str, default: usize) -> usize {
    config
        .map(|c| c.get_int(key, i64::try_from(default).unwrap_or(i64::MAX)))
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

fn short_method_name(config: Option<&RuleConfig>) -> ShortMethodName {
    let mut rule = ShortMethodName::new().minimum(usize_option(config, "minimum", 3));
    for exception in config.and_then(|c| c.get_str_array("exceptions")).unwrap_or_default() {
        rule = rule.exception(exception);
    }
    rule
}

fn camel_case_method_name(config: Option<&RuleConfig>) -> CamelCaseMethodName {
    CamelCaseMethodName::new()
        .allow_underscore(config.is_some_and(|c| c.get_bool("allow_underscore", false)))
        .allow_underscore_test(config.is_some_and(|c| c.get_bool("allow_underscore_test", false)))
}

fn too_many_methods(config: Option<&RuleConfig>) -> TooManyMethods {
    let rule = TooManyMethods::new().max_methods(usize_option(config, "max_methods", 25));
    match config.and_then(|c| c.get_str_array("ignore_prefixes")) {
        Some(prefixes) => rule.ignore_prefixes(prefixes),
        None => rule,
    }
}
