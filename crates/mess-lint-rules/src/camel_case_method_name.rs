//! Rule to require camelCase method names.
//!
//! A name is camelCase when it starts with a lowercase ASCII letter and
//! contains only ASCII letters and digits afterwards. Magic methods
//! (`__construct`, `__toString`, ...) are never flagged.
//!
//! # Configuration
//!
//! - `allow_underscore`: Allow a single leading underscore (default: false)
//! - `allow_underscore_test`: Allow underscores in test methods (`test_it_works`) in test files (default: false)

use std::collections::BTreeMap;

use mess_lint_core::{FileContext, Rule, Severity, Suggestion, SyntaxNode, Violation};

/// Rule code for `CamelCaseMethodName`.
pub const CODE: &str = "ML002";

/// Rule name for `CamelCaseMethodName`.
pub const NAME: &str = "CamelCaseMethodName";

/// Flags method names that are not camelCase.
#[derive(Debug, Clone)]
pub struct CamelCaseMethodName {
    allow_underscore: bool,
    allow_underscore_test: bool,
    severity: Severity,
}

impl Default for CamelCaseMethodName {
    fn default() -> Self {
        Self::new()
    }
}

impl CamelCaseMethodName {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_underscore: false,
            allow_underscore_test: false,
            severity: Severity::Warning,
        }
    }

    /// Allows one leading underscore (`_helper`).
    #[must_use]
    pub fn allow_underscore(mut self, allow: bool) -> Self {
        self.allow_underscore = allow;
        self
    }

    /// Allows underscores in `test*` methods of test files.
    #[must_use]
    pub fn allow_underscore_test(mut self, allow: bool) -> Self {
        self.allow_underscore_test = allow;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_allowed(&self, name: &str, in_test_file: bool) -> bool {
        if name.starts_with("__") {
            return true;
        }
        if self.allow_underscore_test && in_test_file && name.starts_with("test") {
            return name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        }
        let name = if self.allow_underscore {
            name.strip_prefix('_').unwrap_or(name)
        } else {
            name
        };
        is_camel_case(name)
    }
}

fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.all(|c| c.is_ascii_alphanumeric())
}

impl Rule for CamelCaseMethodName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires camelCase method names"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("allow_underscore".to_string(), self.allow_underscore.to_string()),
            (
                "allow_underscore_test".to_string(),
                self.allow_underscore_test.to_string(),
            ),
        ])
    }

    fn check(&self, ctx: &FileContext<'_>, node: &SyntaxNode<'_>) -> Vec<Violation> {
        let SyntaxNode::Method(method) = node else {
            return Vec::new();
        };
        if self.is_allowed(method.name(), ctx.is_test) {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(&method.span()),
            format!("The method {} is not named in camelCase.", method.name()),
        )
        .with_node(method.fully_qualified_name())
        .with_suggestion(Suggestion::new(
            "Start with a lowercase letter and capitalize each following word",
        ))]
    }
}
