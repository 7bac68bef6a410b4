//! Rule to flag method names that are too short to be meaningful.
//!
//! # Rationale
//!
//! Names like `a()` or `do()` say nothing about what a method does.
//!
//! # Configuration
//!
//! - `minimum`: Minimum name length (default: 3)
//! - `exceptions`: Names that are allowed anyway (array or comma-separated string)

use std::collections::{BTreeMap, BTreeSet};

use mess_lint_core::{FileContext, Rule, Severity, Suggestion, SyntaxNode, Violation};

/// Rule code for `ShortMethodName`.
pub const CODE: &str = "ML001";

/// Rule name for `ShortMethodName`.
pub const NAME: &str = "ShortMethodName";

/// Flags methods whose names are shorter than a minimum length.
#[derive(Debug, Clone)]
pub struct ShortMethodName {
    minimum: usize,
    exceptions: BTreeSet<String>,
    severity: Severity,
}

impl Default for ShortMethodName {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortMethodName {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            minimum: 3,
            exceptions: BTreeSet::new(),
            severity: Severity::Warning,
        }
    }

    /// Sets the minimum name length.
    #[must_use]
    pub fn minimum(mut self, minimum: usize) -> Self {
        self.minimum = minimum;
        self
    }

    /// Allows a name regardless of its length.
    #[must_use]
    pub fn exception(mut self, name: impl Into<String>) -> Self {
        self.exceptions.insert(name.into());
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ShortMethodName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags method names shorter than a minimum length"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("minimum".to_string(), self.minimum.to_string()),
            (
                "exceptions".to_string(),
                self.exceptions.iter().cloned().collect::<Vec<_>>().join(","),
            ),
        ])
    }

    fn check(&self, ctx: &FileContext<'_>, node: &SyntaxNode<'_>) -> Vec<Violation> {
        let SyntaxNode::Method(method) = node else {
            return Vec::new();
        };
        let name = method.name();
        if name.chars().count() >= self.minimum || self.exceptions.contains(name) {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(&method.span()),
            format!(
                "Avoid using short method names like {}::{}(). The configured minimum method name length is {}.",
                method.parent_type().name(),
                name,
                self.minimum
            ),
        )
        .with_node(method.fully_qualified_name())
        .with_suggestion(Suggestion::new("Rename the method to describe what it does"))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint_core::ast::{Codebase, MethodDecl, Span, TypeDecl};
    use mess_lint_core::TypeNode;
    use std::path::{Path, PathBuf};

    fn codebase() -> Codebase {
        Codebase::from_types([TypeDecl::class("App", "Point")
            .method(MethodDecl::new("x").at(Span::lines(4, 4)))
            .method(MethodDecl::new("id"))
            .method(MethodDecl::new("getX"))
            .in_file("src/Point.php")])
    }

    fn check(rule: &ShortMethodName) -> Vec<Violation> {
        let codebase = codebase();
        let ctx = FileContext::new(Path::new("src/Point.php"), Path::new(""));
        let point = TypeNode::new(codebase.get("App\\Point").expect("declared"), &codebase);

        let mut violations = rule.check(&ctx, &SyntaxNode::Type(point.clone()));
        for method in point.methods() {
            violations.extend(rule.check(&ctx, &SyntaxNode::Method(method)));
        }
        violations
    }

    #[test]
    fn flags_names_below_minimum() {
        let violations = check(&ShortMethodName::new());
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].location.file, PathBuf::from("src/Point.php"));
        assert_eq!(violations[0].location.line, 4);
        assert_eq!(violations[0].node.as_deref(), Some("App\\Point::x()"));
        assert_eq!(
            violations[0].message,
            "Avoid using short method names like Point::x(). The configured minimum method name length is 3."
        );
    }

    #[test]
    fn exceptions_are_allowed() {
        let violations = check(&ShortMethodName::new().exception("id"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node.as_deref(), Some("App\\Point::x()"));
    }

    #[test]
    fn minimum_is_configurable() {
        assert!(check(&ShortMethodName::new().minimum(1)).is_empty());
        assert_eq!(check(&ShortMethodName::new().minimum(5)).len(), 3);
    }

    #[test]
    fn properties_cover_parameters() {
        let props = ShortMethodName::new().exception("id").exception("at").properties();
        assert_eq!(props["minimum"], "3");
        assert_eq!(props["exceptions"], "at,id");
    }
}
