//! PHP front end using Tree-sitter.

use std::path::Path;
use tracing::trace;
use tree_sitter::{Language, Node, Parser};

use mess_lint_core::ast::{MethodDecl, SourceUnit, Span, TypeDecl, TypeKind, Visibility};

use crate::error::ExtractError;
use crate::extractor::LanguageExtractor;
use crate::names::NameScope;

/// Extracts classes, interfaces and traits from PHP source.
///
/// Type references are resolved against the enclosing namespace and the
/// `use` imports in effect, so the resulting declarations can be indexed
/// by fully qualified name.
pub struct PhpExtractor {
    language: Language,
}

impl PhpExtractor {
    /// Creates a new PHP extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }
}

impl Default for PhpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for PhpExtractor {
    fn language_id(&self) -> &'static str {
        "php"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php"]
    }

    fn extract(&self, path: &Path, source: &str) -> Result<SourceUnit, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractError::Language {
                language: "php",
                reason: e.to_string(),
            })?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or_else(|| ExtractError::NoTree {
            path: path.to_path_buf(),
        })?;
        let root = tree.root_node();

        if let Some(error) = first_error(root) {
            return Err(ExtractError::Syntax {
                path: path.to_path_buf(),
                line: error.start_position().row + 1,
                column: error.start_position().column + 1,
            });
        }

        let mut walker = Walker {
            src,
            path,
            types: Vec::new(),
        };
        walker.statements(root, &mut NameScope::default());
        trace!("{}: {} type(s)", path.display(), walker.types.len());

        Ok(SourceUnit {
            path: path.to_path_buf(),
            types: walker.types,
        })
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(error) = first_error(child) {
            return Some(error);
        }
    }
    None
}

// ── Tree walk ──

struct Walker<'s> {
    src: &'s [u8],
    path: &'s Path,
    types: Vec<TypeDecl>,
}

impl Walker<'_> {
    fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// Top-level statements of the program or of a braced namespace.
    fn statements(&mut self, parent: Node<'_>, scope: &mut NameScope) {
        let mut cursor = parent.walk();
        for node in parent.named_children(&mut cursor) {
            match node.kind() {
                "namespace_definition" => {
                    let namespace = node
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    match node.child_by_field_name("body") {
                        Some(body) => self.statements(body, &mut NameScope::new(namespace)),
                        None => *scope = NameScope::new(namespace),
                    }
                }
                "namespace_use_declaration" => self.imports(node, scope),
                "class_declaration" => self.type_declaration(TypeKind::Class, node, scope),
                "interface_declaration" => self.type_declaration(TypeKind::Interface, node, scope),
                "trait_declaration" => self.type_declaration(TypeKind::Trait, node, scope),
                _ => {}
            }
        }
    }

    fn imports(&self, node: Node<'_>, scope: &mut NameScope) {
        if imports_functions_or_constants(node) {
            return;
        }
        let mut prefix: Option<String> = None;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "namespace_name" => prefix = Some(self.text(child).to_string()),
                "namespace_use_clause" => self.import_clause(child, None, scope),
                "namespace_use_group" => {
                    let mut group_cursor = child.walk();
                    for clause in child.named_children(&mut group_cursor) {
                        if clause.kind() == "namespace_use_clause" {
                            self.import_clause(clause, prefix.as_deref(), scope);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_clause(&self, clause: Node<'_>, prefix: Option<&str>, scope: &mut NameScope) {
        if imports_functions_or_constants(clause) {
            return;
        }
        let alias = clause.child_by_field_name("alias").or_else(|| {
            let mut cursor = clause.walk();
            let aliasing = clause
                .named_children(&mut cursor)
                .find(|c| c.kind() == "namespace_aliasing_clause");
            aliasing.and_then(|a| a.named_child(0))
        });

        let mut cursor = clause.walk();
        let target = clause.named_children(&mut cursor).find(|c| {
            matches!(c.kind(), "name" | "qualified_name") && Some(c.id()) != alias.map(|a| a.id())
        });
        let Some(target) = target else {
            return;
        };

        let path = match prefix {
            Some(prefix) => format!("{}\\{}", prefix.trim_end_matches('\\'), self.text(target)),
            None => self.text(target).to_string(),
        };
        scope.import(&path, alias.map(|a| self.text(a)));
    }

    fn type_declaration(&mut self, kind: TypeKind, node: Node<'_>, scope: &NameScope) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let mut decl = TypeDecl::new(kind, scope.namespace(), self.text(name)).in_file(self.path);
        decl.span = span(name, node);
        decl.doc_comment = self.doc_comment(node);
        decl.attributes = self.attributes(node, scope);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "abstract_modifier" => decl.is_abstract = true,
                "base_clause" => decl.extends = self.type_names(child, scope),
                "class_interface_clause" => decl.implements = self.type_names(child, scope),
                _ => {}
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            let mut body_cursor = body.walk();
            for member in body.named_children(&mut body_cursor) {
                match member.kind() {
                    "use_declaration" => decl.traits.extend(self.type_names(member, scope)),
                    "method_declaration" => decl.methods.push(self.method(member, kind, scope)),
                    _ => {}
                }
            }
        }

        self.types.push(decl);
    }

    fn method(&self, node: Node<'_>, owner: TypeKind, scope: &NameScope) -> MethodDecl {
        let name = node.child_by_field_name("name");
        let mut method = MethodDecl::new(name.map(|n| self.text(n)).unwrap_or_default());

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "visibility_modifier" => {
                    method.visibility = match self.text(child).to_ascii_lowercase().as_str() {
                        "private" => Visibility::Private,
                        "protected" => Visibility::Protected,
                        _ => Visibility::Public,
                    };
                }
                "static_modifier" => method.is_static = true,
                "abstract_modifier" => method.is_abstract = true,
                _ => {}
            }
        }

        method.has_body = node.child_by_field_name("body").is_some();
        if owner == TypeKind::Interface {
            method.is_abstract = true;
        }
        method.parameter_count = node
            .child_by_field_name("parameters")
            .map_or(0, |params| {
                let mut params_cursor = params.walk();
                let count = params
                    .named_children(&mut params_cursor)
                    .filter(|p| p.kind().ends_with("_parameter"))
                    .count();
                count
            });
        method.doc_comment = self.doc_comment(node);
        method.attributes = self.attributes(node, scope);
        method.span = span(name.unwrap_or(node), node);
        method
    }

    /// Names listed in `extends`, `implements` or a trait `use`.
    fn type_names(&self, node: Node<'_>, scope: &NameScope) -> Vec<String> {
        let mut cursor = node.walk();
        let names = node
            .named_children(&mut cursor)
            .filter(|c| matches!(c.kind(), "name" | "qualified_name"))
            .map(|c| scope.resolve(self.text(c)))
            .collect();
        names
    }

    /// The `/** ... */` comment directly before a declaration.
    fn doc_comment(&self, node: Node<'_>) -> Option<String> {
        let previous = node.prev_sibling()?;
        let text = self.text(previous);
        (previous.kind() == "comment" && text.starts_with("/**")).then(|| text.to_string())
    }

    fn attributes(&self, node: Node<'_>, scope: &NameScope) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "attribute_list" {
                self.collect_attributes(child, scope, &mut names);
            }
        }
        names
    }

    fn collect_attributes(&self, node: Node<'_>, scope: &NameScope, names: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "attribute" {
                let mut attr_cursor = child.walk();
                let name = child
                    .named_children(&mut attr_cursor)
                    .find(|c| matches!(c.kind(), "name" | "qualified_name"));
                if let Some(name) = name {
                    names.push(scope.resolve(self.text(name)));
                }
            } else {
                self.collect_attributes(child, scope, names);
            }
        }
    }
}

/// `use function ...;` and `use const ...;` import no classes.
fn imports_functions_or_constants(node: Node<'_>) -> bool {
    if node.child_by_field_name("type").is_some() {
        return true;
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && matches!(c.kind(), "function" | "const"));
    found
}

fn span(name: Node<'_>, declaration: Node<'_>) -> Span {
    Span {
        start_line: name.start_position().row + 1,
        end_line: declaration.end_position().row + 1,
        start_column: name.start_position().column + 1,
        start_byte: name.start_byte(),
        end_byte: name.end_byte(),
    }
}
