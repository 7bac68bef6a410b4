//! Raw syntax model produced by language front ends.
//!
//! Front ends (see `mess-lint-php`) lower their concrete syntax trees into
//! these plain structs. Type references (`extends`, `implements`, `traits`)
//! are stored already resolved to fully qualified names without a leading
//! namespace separator. The node model in [`crate::node`] wraps these
//! entities read-only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Namespace separator used in fully qualified names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Position of a syntax entity in its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First line (1-indexed).
    pub start_line: usize,
    /// Last line (1-indexed).
    pub end_line: usize,
    /// Column of the first character (1-indexed).
    pub start_column: usize,
    /// Byte offset of the first character.
    pub start_byte: usize,
    /// Byte offset one past the last character.
    pub end_byte: usize,
}

impl Span {
    /// Creates a span covering whole lines.
    #[must_use]
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            start_column: 1,
            ..Self::default()
        }
    }
}

/// Declared kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `trait`
    Trait,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
            Self::Trait => write!(f, "trait"),
        }
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible everywhere (the default when no modifier is written).
    #[default]
    Public,
    /// Visible to the type and its descendants.
    Protected,
    /// Visible to the declaring type only.
    Private,
}

/// A method as written inside a type body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name as written.
    pub name: String,
    /// Declared visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// `abstract` modifier present.
    #[serde(default)]
    pub is_abstract: bool,
    /// `static` modifier present.
    #[serde(default)]
    pub is_static: bool,
    /// Whether the method has a body (interface and abstract methods don't).
    #[serde(default = "default_true")]
    pub has_body: bool,
    /// Number of formal parameters.
    #[serde(default)]
    pub parameter_count: usize,
    /// Raw `/** ... */` comment preceding the method.
    #[serde(default)]
    pub doc_comment: Option<String>,
    /// Attribute names, resolved where imports allow (e.g. `Override`).
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Location of the method name.
    #[serde(default)]
    pub span: Span,
}

impl MethodDecl {
    /// Creates a public, concrete method with a body.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            is_static: false,
            has_body: true,
            parameter_count: 0,
            doc_comment: None,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Marks the method as bodiless (`abstract` or interface signature).
    #[must_use]
    pub fn signature_only(mut self) -> Self {
        self.has_body = false;
        self
    }

    /// Marks the method `abstract` (implies no body).
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self.has_body = false;
        self
    }

    /// Sets the doc comment.
    #[must_use]
    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// A class, interface, or trait declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared kind.
    pub kind: TypeKind,
    /// Enclosing namespace without leading separator; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Short type name.
    pub name: String,
    /// Parent class (for classes, at most one) or extended interfaces.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Implemented interfaces (classes only).
    #[serde(default)]
    pub implements: Vec<String>,
    /// Composed traits.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Methods written in the type body, in source order.
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Raw `/** ... */` comment preceding the type.
    #[serde(default)]
    pub doc_comment: Option<String>,
    /// Attribute names.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// `abstract` modifier present.
    #[serde(default)]
    pub is_abstract: bool,
    /// Location of the type name.
    #[serde(default)]
    pub span: Span,
    /// File the type was declared in, relative to the analysis root.
    #[serde(default)]
    pub file: PathBuf,
}

impl TypeDecl {
    /// Creates an empty declaration of the given kind.
    #[must_use]
    pub fn new(kind: TypeKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
            extends: Vec::new(),
            implements: Vec::new(),
            traits: Vec::new(),
            methods: Vec::new(),
            doc_comment: None,
            attributes: Vec::new(),
            is_abstract: false,
            span: Span::default(),
            file: PathBuf::new(),
        }
    }

    /// Shorthand for a class declaration.
    #[must_use]
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, namespace, name)
    }

    /// Shorthand for an interface declaration.
    #[must_use]
    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, namespace, name)
    }

    /// Shorthand for a trait declaration.
    #[must_use]
    pub fn trait_decl(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Trait, namespace, name)
    }

    /// Adds a parent class or extended interface.
    #[must_use]
    pub fn extends(mut self, fqn: impl Into<String>) -> Self {
        self.extends.push(fqn.into());
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn implements(mut self, fqn: impl Into<String>) -> Self {
        self.implements.push(fqn.into());
        self
    }

    /// Adds a composed trait.
    #[must_use]
    pub fn uses(mut self, fqn: impl Into<String>) -> Self {
        self.traits.push(fqn.into());
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Sets the doc comment.
    #[must_use]
    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    /// Sets the declaring file.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    /// Returns `Namespace\Name`, or just `Name` in the global namespace.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Finds a method written in this type body, case-insensitively.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// Joins a namespace and a short name.
#[must_use]
pub fn qualify(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches(NAMESPACE_SEPARATOR);
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
    }
}

/// Normalizes a type name into its lookup key (type names are case-insensitive).
#[must_use]
pub fn lookup_key(fqn: &str) -> String {
    fqn.trim_start_matches(NAMESPACE_SEPARATOR).to_lowercase()
}

/// All type declarations found in one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// File path relative to the analysis root.
    pub path: PathBuf,
    /// Declarations in source order.
    pub types: Vec<TypeDecl>,
}

/// Project-wide index of type declarations.
///
/// Hierarchy resolution needs every declaration, not only those of files
/// being re-analyzed, so the index is always built from the full file set.
#[derive(Debug, Default)]
pub struct Codebase {
    types: Vec<TypeDecl>,
    by_name: HashMap<String, usize>,
}

impl Codebase {
    /// Creates an empty codebase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a codebase from a list of declarations.
    #[must_use]
    pub fn from_types(types: impl IntoIterator<Item = TypeDecl>) -> Self {
        let mut codebase = Self::new();
        for decl in types {
            codebase.insert(decl);
        }
        codebase
    }

    /// Adds every declaration of a source unit.
    pub fn add_unit(&mut self, unit: SourceUnit) {
        for mut decl in unit.types {
            if decl.file.as_os_str().is_empty() {
                decl.file.clone_from(&unit.path);
            }
            self.insert(decl);
        }
    }

    /// Adds one declaration. A second declaration of the same name is kept
    /// but not indexed; lookups resolve to the first one.
    pub fn insert(&mut self, decl: TypeDecl) {
        let key = lookup_key(&decl.qualified_name());
        let index = self.types.len();
        if let Some(&existing) = self.by_name.get(&key) {
            warn!(
                "Duplicate declaration of {} in {} (first declared in {})",
                decl.qualified_name(),
                decl.file.display(),
                self.types[existing].file.display()
            );
        } else {
            self.by_name.insert(key, index);
        }
        self.types.push(decl);
    }

    /// Resolves a fully qualified type name.
    #[must_use]
    pub fn get(&self, fqn: &str) -> Option<&TypeDecl> {
        self.by_name
            .get(&lookup_key(fqn))
            .and_then(|&i| self.types.get(i))
    }

    /// Iterates over all declarations.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    /// Iterates over declarations from one file.
    pub fn types_in<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a TypeDecl> + 'a {
        self.types.iter().filter(move |t| t.file == file)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` when no declarations are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_omits_empty_namespace() {
        assert_eq!(TypeDecl::class("", "Foo").qualified_name(), "Foo");
        assert_eq!(
            TypeDecl::class("Sindelfingen", "MyClass").qualified_name(),
            "Sindelfingen\\MyClass"
        );
        assert_eq!(qualify("\\App\\", "User"), "App\\User");
    }

    #[test]
    fn lookup_is_case_insensitive_and_ignores_leading_separator() {
        let codebase = Codebase::from_types([TypeDecl::class("App\\Model", "User")]);
        assert!(codebase.get("\\app\\model\\USER").is_some());
        assert!(codebase.get("App\\Model\\Missing").is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let codebase = Codebase::from_types([
            TypeDecl::class("", "Foo").in_file("a.php"),
            TypeDecl::class("", "Foo").in_file("b.php"),
        ]);
        assert_eq!(codebase.len(), 2);
        assert_eq!(
            codebase.get("Foo").map(|t| t.file.clone()),
            Some(PathBuf::from("a.php"))
        );
    }

    #[test]
    fn add_unit_fills_in_file() {
        let mut codebase = Codebase::new();
        codebase.add_unit(SourceUnit {
            path: PathBuf::from("src/Foo.php"),
            types: vec![TypeDecl::interface("", "Foo")],
        });
        let file = PathBuf::from("src/Foo.php");
        assert_eq!(codebase.types_in(&file).count(), 1);
    }

    #[test]
    fn method_decl_deserializes_with_defaults() {
        let m: MethodDecl = serde_json::from_str(r#"{"name":"run"}"#).expect("valid json");
        assert!(m.has_body);
        assert_eq!(m.visibility, Visibility::Public);
    }

    #[test]
    fn find_method_ignores_case() {
        let t = TypeDecl::class("", "Foo").method(MethodDecl::new("getBar"));
        assert!(t.find_method("GETBAR").is_some());
    }
}
