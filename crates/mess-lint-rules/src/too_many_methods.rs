//! Rule to limit the number of methods per type.
//!
//! # Rationale
//!
//! A type with many methods usually has more than one responsibility.
//! Accessors and fluent setters are cheap and are not counted.
//!
//! # Configuration
//!
//! - `max_methods`: Maximum number of counted methods (default: 25)
//! - `ignore_prefixes`: Case-insensitive name prefixes that are not counted
//!   (default: `get`, `set`, `is`, `has`, `with`)

use std::collections::BTreeMap;

use mess_lint_core::{FileContext, Rule, Severity, Suggestion, SyntaxNode, Violation};

/// Rule code for `TooManyMethods`.
pub const CODE: &str = "ML003";

/// Rule name for `TooManyMethods`.
pub const NAME: &str = "TooManyMethods";

const DEFAULT_IGNORE_PREFIXES: &[&str] = &["get", "set", "is", "has", "with"];

/// Flags types that declare too many methods.
#[derive(Debug, Clone)]
pub struct TooManyMethods {
    max_methods: usize,
    ignore_prefixes: Vec<String>,
    severity: Severity,
}

impl Default for TooManyMethods {
    fn default() -> Self {
        Self::new()
    }
}

impl TooManyMethods {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_methods: 25,
            ignore_prefixes: DEFAULT_IGNORE_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            severity: Severity::Warning,
        }
    }

    /// Sets the maximum number of counted methods.
    #[must_use]
    pub fn max_methods(mut self, max: usize) -> Self {
        self.max_methods = max;
        self
    }

    /// Replaces the ignored name prefixes.
    #[must_use]
    pub fn ignore_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_prefixes = prefixes
            .into_iter()
            .map(|p| p.into().to_lowercase())
            .collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_counted(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        !self.ignore_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
    }
}

impl Rule for TooManyMethods {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Limits the number of non-accessor methods per type"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("max_methods".to_string(), self.max_methods.to_string()),
            ("ignore_prefixes".to_string(), self.ignore_prefixes.join(",")),
        ])
    }

    fn check(&self, ctx: &FileContext<'_>, node: &SyntaxNode<'_>) -> Vec<Violation> {
        let SyntaxNode::Type(ty) = node else {
            return Vec::new();
        };
        let count = ty
            .as_raw()
            .methods
            .iter()
            .filter(|m| self.is_counted(&m.name))
            .count();
        if count <= self.max_methods {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(&ty.span()),
            format!(
                "The {} {} has {} non-getter- and setter-methods. Consider refactoring {} to keep number of methods under {}.",
                ty.kind(),
                ty.name(),
                count,
                ty.name(),
                self.max_methods
            ),
        )
        .with_node(ty.fully_qualified_name())
        .with_suggestion(Suggestion::new("Split the type along its responsibilities"))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint_core::ast::{Codebase, MethodDecl, TypeDecl};
    use mess_lint_core::TypeNode;
    use std::path::Path;

    fn check(rule: &TooManyMethods, names: &[&str]) -> Vec<Violation> {
        let mut decl = TypeDecl::class("App", "Service");
        for name in names {
            decl = decl.method(MethodDecl::new(*name));
        }
        let codebase = Codebase::from_types([decl]);
        let ctx = FileContext::new(Path::new("src/Service.php"), Path::new(""));
        let service = TypeNode::new(codebase.get("App\\Service").expect("declared"), &codebase);

        let mut violations = rule.check(&ctx, &SyntaxNode::Type(service.clone()));
        for method in service.methods() {
            violations.extend(rule.check(&ctx, &SyntaxNode::Method(method)));
        }
        violations
    }

    #[test]
    fn accessors_are_not_counted() {
        let names = ["run", "stop", "getName", "setName", "isRunning", "HasJobs", "withTimeout"];
        assert!(check(&TooManyMethods::new().max_methods(2), &names).is_empty());

        let violations = check(&TooManyMethods::new().max_methods(1), &names);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node.as_deref(), Some("App\\Service"));
        assert_eq!(
            violations[0].message,
            "The class Service has 2 non-getter- and setter-methods. Consider refactoring Service to keep number of methods under 1."
        );
    }

    #[test]
    fn prefixes_are_configurable() {
        let rule = TooManyMethods::new().max_methods(1).ignore_prefixes(["Run"]);
        assert!(check(&rule, &["run", "runAll"]).is_empty());
        assert_eq!(check(&rule, &["run", "getName", "setName"]).len(), 1);
    }

    #[test]
    fn default_limit_is_twenty_five() {
        let names: Vec<String> = (0..26).map(|i| format!("step{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(check(&TooManyMethods::new(), &names[..25]).is_empty());
        assert_eq!(check(&TooManyMethods::new(), &names).len(), 1);
    }
}
