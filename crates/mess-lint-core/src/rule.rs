//! Rule traits and rule sets.

use std::collections::BTreeMap;

use crate::context::FileContext;
use crate::node::SyntaxNode;
use crate::types::{Severity, Violation};

/// A lint rule evaluated against [`SyntaxNode`]s.
///
/// The analyzer hands every type and every declared method of a file to
/// each rule. Rules ignore node kinds they don't care about. Violations on
/// inherited views and on suppressed nodes are filtered out by the caller,
/// so rules don't need to check [`SyntaxNode::is_declaration`] or
/// [`SyntaxNode::has_suppression_for`] themselves.
///
/// # Example
///
/// ```ignore
/// use mess_lint_core::{FileContext, Rule, Severity, SyntaxNode, Violation};
///
/// pub struct NoGodNames;
///
/// impl Rule for NoGodNames {
///     fn name(&self) -> &'static str { "NoGodNames" }
///     fn code(&self) -> &'static str { "ML100" }
///
///     fn check(&self, ctx: &FileContext, node: &SyntaxNode<'_>) -> Vec<Violation> {
///         match node {
///             SyntaxNode::Type(t) if t.name().ends_with("Manager") => vec![/* ... */],
///             _ => Vec::new(),
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the PascalCase name used in suppression annotations (e.g., "ShortMethodName").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "ML001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Returns the configured parameters that influence this rule's output.
    ///
    /// Used to fingerprint the configuration for the result cache; two rule
    /// instances with equal properties must report identical violations.
    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Checks a single node and returns any violations found.
    fn check(&self, ctx: &FileContext<'_>, node: &SyntaxNode<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// A rule together with the severity it reports at.
pub struct RuleEntry {
    /// The rule.
    pub rule: RuleBox,
    /// Effective severity (the rule default unless overridden by configuration).
    pub severity: Severity,
}

/// A named collection of rules (e.g., "naming", "design").
pub struct RuleSet {
    name: String,
    rules: Vec<RuleEntry>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Adds a rule at its default severity.
    #[must_use]
    pub fn rule<R: Rule + 'static>(self, rule: R) -> Self {
        self.rule_box(Box::new(rule))
    }

    /// Adds a boxed rule at its default severity.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        let severity = rule.default_severity();
        self.rules.push(RuleEntry { rule, severity });
        self
    }

    /// Adds a boxed rule with an explicit severity.
    pub fn push(&mut self, rule: RuleBox, severity: Severity) {
        self.rules.push(RuleEntry { rule, severity });
    }

    /// Returns the rule set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rules in this set.
    #[must_use]
    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One canonical line per rule describing everything that affects its output.
    ///
    /// Sorted, so rule registration order doesn't matter.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rules
            .iter()
            .map(|entry| {
                let properties = entry
                    .rule
                    .properties()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(";");
                format!(
                    "{}/{}[{}] severity={} {}",
                    self.name,
                    entry.rule.name(),
                    entry.rule.code(),
                    entry.severity,
                    properties
                )
            })
            .collect();
        lines.sort();
        lines
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field(
                "rules",
                &self.rules.iter().map(|e| e.rule.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        limit: usize,
    }

    impl Rule for Fixed {
        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn code(&self) -> &'static str {
            "ML900"
        }

        fn properties(&self) -> BTreeMap<String, String> {
            BTreeMap::from([("limit".to_string(), self.limit.to_string())])
        }

        fn check(&self, _ctx: &FileContext<'_>, _node: &SyntaxNode<'_>) -> Vec<Violation> {
            Vec::new()
        }
    }

    struct Other;

    impl Rule for Other {
        fn name(&self) -> &'static str {
            "Other"
        }

        fn code(&self) -> &'static str {
            "ML901"
        }

        fn check(&self, _ctx: &FileContext<'_>, _node: &SyntaxNode<'_>) -> Vec<Violation> {
            Vec::new()
        }
    }

    #[test]
    fn describe_is_independent_of_registration_order() {
        let a = RuleSet::new("design").rule(Fixed { limit: 3 }).rule(Other);
        let b = RuleSet::new("design").rule(Other).rule(Fixed { limit: 3 });
        assert_eq!(a.describe(), b.describe());
    }

    #[test]
    fn describe_includes_properties_and_severity() {
        let mut set = RuleSet::new("design");
        set.push(Box::new(Fixed { limit: 7 }), Severity::Error);
        assert_eq!(
            set.describe(),
            vec!["design/Fixed[ML900] severity=error limit=7".to_string()]
        );
    }
}
