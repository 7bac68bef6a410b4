//! Class name resolution within a namespace scope.

use std::collections::HashMap;

use mess_lint_core::ast::{qualify, NAMESPACE_SEPARATOR};

/// Current namespace plus the class imports (`use` statements) in effect.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    namespace: String,
    imports: HashMap<String, String>,
}

impl NameScope {
    /// Creates a scope for a namespace with no imports.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().trim_matches(NAMESPACE_SEPARATOR).to_string(),
            imports: HashMap::new(),
        }
    }

    /// The current namespace, empty for the global one.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registers `use Path\To\Name [as alias];`.
    pub fn import(&mut self, path: &str, alias: Option<&str>) {
        let path = path.trim_start_matches(NAMESPACE_SEPARATOR);
        let alias = alias.unwrap_or_else(|| last_segment(path));
        self.imports.insert(alias.to_lowercase(), path.to_string());
    }

    /// Resolves a class reference as written to a fully qualified name
    /// without a leading separator.
    ///
    /// - `\A\B` is already fully qualified
    /// - `namespace\B` is relative to the current namespace
    /// - `A\B` or `A` whose first segment is an import alias is expanded
    /// - anything else is prefixed with the current namespace
    #[must_use]
    pub fn resolve(&self, written: &str) -> String {
        let written: String = written.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(absolute) = written.strip_prefix(NAMESPACE_SEPARATOR) {
            return absolute.to_string();
        }

        let (first, rest) = match written.split_once(NAMESPACE_SEPARATOR) {
            Some((first, rest)) => (first, Some(rest)),
            None => (written.as_str(), None),
        };

        if first.eq_ignore_ascii_case("namespace") {
            return qualify(&self.namespace, rest.unwrap_or_default());
        }

        match (self.imports.get(&first.to_lowercase()), rest) {
            (Some(imported), Some(rest)) => qualify(imported, rest),
            (Some(imported), None) => imported.clone(),
            (None, _) => qualify(&self.namespace, &written),
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> NameScope {
        let mut scope = NameScope::new("App\\Http");
        scope.import("Vendor\\Lib\\Client", None);
        scope.import("\\Vendor\\Lib", Some("L"));
        scope
    }

    #[test]
    fn fully_qualified_names_are_kept() {
        assert_eq!(scope().resolve("\\Override"), "Override");
        assert_eq!(scope().resolve("\\Other\\Thing"), "Other\\Thing");
    }

    #[test]
    fn unqualified_names_use_the_current_namespace() {
        assert_eq!(scope().resolve("Controller"), "App\\Http\\Controller");
        assert_eq!(NameScope::default().resolve("Foo"), "Foo");
    }

    #[test]
    fn imports_are_case_insensitive() {
        assert_eq!(scope().resolve("client"), "Vendor\\Lib\\Client");
        assert_eq!(scope().resolve("l\\Response"), "Vendor\\Lib\\Response");
    }

    #[test]
    fn namespace_keyword_is_relative() {
        assert_eq!(scope().resolve("namespace\\Kernel"), "App\\Http\\Kernel");
    }

    #[test]
    fn qualified_names_without_import_are_relative() {
        assert_eq!(scope().resolve("Sub\\Thing"), "App\\Http\\Sub\\Thing");
    }
}
