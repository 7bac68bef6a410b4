//! Inheritance-aware node model.
//!
//! Rules don't look at raw [`TypeDecl`]/[`MethodDecl`] values directly.
//! They receive [`SyntaxNode`]s, which add what a rule needs on top of the
//! raw entity:
//!
//! - fully qualified names (`App\Model\User`, `App\Model\User::save()`)
//! - the enclosing type of a method, classified by its declared kind
//! - declaration status: whether a method is implemented at this type or
//!   only visible because an ancestor declares it
//! - suppression lookup across the whole [ancestor chain](HierarchyResolver)
//!
//! Nodes borrow from a [`Codebase`] and live for one analysis pass.

mod capability;
mod hierarchy;
mod suppression;

pub use capability::{Capability, CapabilityValue, NodeError};
pub use hierarchy::HierarchyResolver;
pub use suppression::Suppressions;

use std::cell::OnceCell;
use std::collections::{HashSet, VecDeque};
use std::path::Path;

use crate::ast::{lookup_key, Codebase, MethodDecl, Span, TypeDecl, TypeKind, Visibility};

/// Shared state behind every [`TypeNode`] variant.
#[derive(Clone)]
pub struct TypeData<'a> {
    decl: &'a TypeDecl,
    codebase: &'a Codebase,
    fqn: OnceCell<String>,
}

/// A class, interface, or trait.
#[derive(Clone)]
pub enum TypeNode<'a> {
    /// A `class` declaration.
    Class(TypeData<'a>),
    /// An `interface` declaration.
    Interface(TypeData<'a>),
    /// A `trait` declaration.
    Trait(TypeData<'a>),
}

impl<'a> TypeNode<'a> {
    /// Wraps a declaration in the variant matching its declared kind.
    #[must_use]
    pub fn new(decl: &'a TypeDecl, codebase: &'a Codebase) -> Self {
        let data = TypeData {
            decl,
            codebase,
            fqn: OnceCell::new(),
        };
        match decl.kind {
            TypeKind::Class => Self::Class(data),
            TypeKind::Interface => Self::Interface(data),
            TypeKind::Trait => Self::Trait(data),
        }
    }

    fn data(&self) -> &TypeData<'a> {
        match self {
            Self::Class(data) | Self::Interface(data) | Self::Trait(data) => data,
        }
    }

    /// Returns the wrapped declaration.
    #[must_use]
    pub fn as_raw(&self) -> &'a TypeDecl {
        self.data().decl
    }

    /// Returns the codebase this node resolves ancestors against.
    #[must_use]
    pub fn codebase(&self) -> &'a Codebase {
        self.data().codebase
    }

    /// Returns the declared kind.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Class(_) => TypeKind::Class,
            Self::Interface(_) => TypeKind::Interface,
            Self::Trait(_) => TypeKind::Trait,
        }
    }

    /// Short name as written.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.as_raw().name
    }

    /// `Namespace\Name`, without a leading separator.
    #[must_use]
    pub fn fully_qualified_name(&self) -> &str {
        let data = self.data();
        data.fqn.get_or_init(|| data.decl.qualified_name())
    }

    /// File the type was declared in.
    #[must_use]
    pub fn file(&self) -> &'a Path {
        &self.as_raw().file
    }

    /// Location of the type name.
    #[must_use]
    pub fn span(&self) -> Span {
        self.as_raw().span
    }

    /// Returns `true` if both nodes wrap the same declaration.
    #[must_use]
    pub fn is_same(&self, other: &TypeNode<'_>) -> bool {
        std::ptr::eq(self.as_raw(), other.as_raw())
    }

    /// Self, superclasses, interfaces, traits.
    #[must_use]
    pub fn ancestor_chain(&self) -> Vec<TypeNode<'a>> {
        HierarchyResolver::new(self.codebase()).ancestor_chain(self)
    }

    /// Methods written in this type's body.
    #[must_use]
    pub fn methods(&self) -> Vec<MethodNode<'a>> {
        let decl = self.as_raw();
        decl.methods
            .iter()
            .map(|m| MethodNode::new(m, decl, self.codebase()))
            .collect()
    }

    /// Methods written here plus views of methods visible through ancestors.
    ///
    /// When several ancestors provide the same name, the one PHP would
    /// dispatch to wins: the type's own body, then traits it composes, then
    /// each superclass followed by that superclass's traits, then
    /// interfaces. Private methods of parent classes are not visible.
    #[must_use]
    pub fn all_methods(&self) -> Vec<MethodNode<'a>> {
        let me = self.as_raw();
        let mut seen = HashSet::new();
        let mut methods = Vec::new();

        for ancestor in self.resolution_order() {
            let decl = ancestor.as_raw();
            let own = std::ptr::eq(decl, me);
            for m in &decl.methods {
                if !own && decl.kind == TypeKind::Class && m.visibility == Visibility::Private {
                    continue;
                }
                if seen.insert(m.name.to_lowercase()) {
                    methods.push(MethodNode::view(m, decl, me, self.codebase()));
                }
            }
        }
        methods
    }

    /// Ancestor chain reordered so each class is directly followed by the
    /// traits it composes (transitively). Interfaces come last.
    fn resolution_order(&self) -> Vec<TypeNode<'a>> {
        let chain = self.ancestor_chain();
        let mut placed: HashSet<String> = HashSet::new();
        let mut order = Vec::with_capacity(chain.len());

        let lineage = chain
            .iter()
            .filter(|node| node.is_same(self) || node.kind() == TypeKind::Class);
        for node in lineage {
            if !placed.insert(lookup_key(node.fully_qualified_name())) {
                continue;
            }
            order.push(node.clone());

            let mut pending: VecDeque<&String> = node.as_raw().traits.iter().collect();
            while let Some(name) = pending.pop_front() {
                let key = lookup_key(name);
                let Some(used) = chain
                    .iter()
                    .find(|t| t.kind() == TypeKind::Trait && lookup_key(t.fully_qualified_name()) == key)
                else {
                    continue;
                };
                if placed.insert(key) {
                    pending.extend(used.as_raw().traits.iter());
                    order.push(used.clone());
                }
            }
        }

        for node in chain {
            if placed.insert(lookup_key(node.fully_qualified_name())) {
                order.push(node);
            }
        }
        order
    }

    /// Looks up a method by name, including inherited ones.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<MethodNode<'a>> {
        self.all_methods()
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Returns `true` if the type carries an attribute with this name.
    ///
    /// A leading namespace separator is ignored on both sides.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        has_attribute(&self.as_raw().attributes, name)
    }

    /// Returns `true` if a suppression annotation on this type or any of
    /// its ancestors names `rule`.
    #[must_use]
    pub fn has_suppression_for(&self, rule: &str) -> bool {
        self.ancestor_chain().iter().any(|ancestor| {
            Suppressions::from_doc(ancestor.as_raw().doc_comment.as_deref()).suppresses(rule)
        })
    }

    /// Answers a capability query against the wrapped declaration.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::NoSuchCapability`] for method-only capabilities.
    pub fn query(&self, capability: Capability) -> Result<CapabilityValue<'a>, NodeError> {
        let decl = self.as_raw();
        let value = match capability {
            Capability::Name => CapabilityValue::Text(&decl.name),
            Capability::Namespace => CapabilityValue::Text(&decl.namespace),
            Capability::TypeKind => CapabilityValue::Kind(decl.kind),
            Capability::StartLine => CapabilityValue::Number(decl.span.start_line),
            Capability::EndLine => CapabilityValue::Number(decl.span.end_line),
            Capability::DocComment => text_or_absent(decl.doc_comment.as_deref()),
            Capability::IsAbstract => CapabilityValue::Flag(decl.is_abstract),
            Capability::Visibility
            | Capability::IsStatic
            | Capability::ParameterCount
            | Capability::HasBody => {
                return Err(NodeError::NoSuchCapability {
                    capability,
                    node: self.fully_qualified_name().to_string(),
                })
            }
        };
        Ok(value)
    }
}

impl std::fmt::Debug for TypeNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Self::Class(_) => "Class",
            Self::Interface(_) => "Interface",
            Self::Trait(_) => "Trait",
        };
        f.debug_tuple(variant)
            .field(&self.fully_qualified_name())
            .finish()
    }
}

/// A method, seen from a particular type.
///
/// `parent_type` is always the type whose body contains the method. The
/// node may be viewed from a descendant (see [`TypeNode::all_methods`]), in
/// which case it is an inherited view and not a declaration.
#[derive(Clone)]
pub struct MethodNode<'a> {
    decl: &'a MethodDecl,
    owner: &'a TypeDecl,
    viewed_from: &'a TypeDecl,
    codebase: &'a Codebase,
    parent: OnceCell<TypeNode<'a>>,
    fqn: OnceCell<String>,
}

impl<'a> MethodNode<'a> {
    /// Wraps a method written in `owner`'s body.
    #[must_use]
    pub fn new(decl: &'a MethodDecl, owner: &'a TypeDecl, codebase: &'a Codebase) -> Self {
        Self::view(decl, owner, owner, codebase)
    }

    /// Wraps a method written in `owner`'s body, as seen from `viewed_from`.
    #[must_use]
    pub fn view(
        decl: &'a MethodDecl,
        owner: &'a TypeDecl,
        viewed_from: &'a TypeDecl,
        codebase: &'a Codebase,
    ) -> Self {
        Self {
            decl,
            owner,
            viewed_from,
            codebase,
            parent: OnceCell::new(),
            fqn: OnceCell::new(),
        }
    }

    /// Returns the wrapped method.
    #[must_use]
    pub fn as_raw(&self) -> &'a MethodDecl {
        self.decl
    }

    /// Method name as written.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.decl.name
    }

    /// `Namespace\Type::method()`, using the enclosing type.
    #[must_use]
    pub fn fully_qualified_name(&self) -> &str {
        self.fqn.get_or_init(|| {
            format!(
                "{}::{}()",
                self.parent_type().fully_qualified_name(),
                self.decl.name
            )
        })
    }

    /// The enclosing type, as the variant of its declared kind.
    #[must_use]
    pub fn parent_type(&self) -> &TypeNode<'a> {
        self.parent
            .get_or_init(|| TypeNode::new(self.owner, self.codebase))
    }

    /// The type this method was looked up on.
    #[must_use]
    pub fn viewed_from(&self) -> TypeNode<'a> {
        TypeNode::new(self.viewed_from, self.codebase)
    }

    /// Returns `true` if this node is a view of an ancestor's method.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        !std::ptr::eq(self.owner, self.viewed_from)
    }

    /// File containing the method.
    #[must_use]
    pub fn file(&self) -> &'a Path {
        &self.owner.file
    }

    /// Location of the method name.
    #[must_use]
    pub fn span(&self) -> Span {
        self.decl.span
    }

    /// Returns `true` if the method is introduced at the type it is viewed from.
    ///
    /// - inherited views are never declarations
    /// - a method with a body is a declaration, including overrides and
    ///   implementations of interface or abstract methods
    /// - a bodiless signature is a declaration only when no ancestor
    ///   already has a method of that name
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        if self.is_inherited() {
            return false;
        }
        if self.decl.has_body {
            return true;
        }
        self.overridden_member().is_none()
    }

    /// The nearest ancestor method this one overrides or implements.
    #[must_use]
    pub fn overridden_member(&self) -> Option<MethodNode<'a>> {
        let resolver = HierarchyResolver::new(self.codebase);
        let owner = self.parent_type().clone();
        resolver
            .ancestor_chain(&owner)
            .iter()
            .skip(1)
            .find_map(|ancestor| resolver.corresponding_ancestor_member(self, ancestor))
    }

    /// Returns `true` if the method carries an attribute with this name.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        has_attribute(&self.decl.attributes, name)
    }

    /// Returns `true` for methods marked `#[\Override]`.
    #[must_use]
    pub fn has_override_attribute(&self) -> bool {
        self.has_attribute("Override")
    }

    /// Returns `true` if a suppression annotation names `rule`.
    ///
    /// Looks at the method itself, then walks the ancestor chain of the
    /// type it is viewed from. At each ancestor the same-named method is
    /// checked before the type's own annotations.
    #[must_use]
    pub fn has_suppression_for(&self, rule: &str) -> bool {
        if Suppressions::from_doc(self.decl.doc_comment.as_deref()).suppresses(rule) {
            return true;
        }
        let resolver = HierarchyResolver::new(self.codebase);
        resolver
            .ancestor_chain(&self.viewed_from())
            .iter()
            .any(|ancestor| {
                let member_suppressed = resolver
                    .corresponding_ancestor_member(self, ancestor)
                    .is_some_and(|m| {
                        Suppressions::from_doc(m.decl.doc_comment.as_deref()).suppresses(rule)
                    });
                member_suppressed
                    || Suppressions::from_doc(ancestor.as_raw().doc_comment.as_deref())
                        .suppresses(rule)
            })
    }

    /// Answers a capability query against the wrapped method.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::NoSuchCapability`] for type-only capabilities.
    pub fn query(&self, capability: Capability) -> Result<CapabilityValue<'a>, NodeError> {
        let decl = self.decl;
        let value = match capability {
            Capability::Name => CapabilityValue::Text(&decl.name),
            Capability::StartLine => CapabilityValue::Number(decl.span.start_line),
            Capability::EndLine => CapabilityValue::Number(decl.span.end_line),
            Capability::DocComment => text_or_absent(decl.doc_comment.as_deref()),
            Capability::IsAbstract => CapabilityValue::Flag(decl.is_abstract),
            Capability::Visibility => CapabilityValue::Visibility(decl.visibility),
            Capability::IsStatic => CapabilityValue::Flag(decl.is_static),
            Capability::ParameterCount => CapabilityValue::Number(decl.parameter_count),
            Capability::HasBody => CapabilityValue::Flag(decl.has_body),
            Capability::Namespace | Capability::TypeKind => {
                return Err(NodeError::NoSuchCapability {
                    capability,
                    node: self.fully_qualified_name().to_string(),
                })
            }
        };
        Ok(value)
    }
}

impl std::fmt::Debug for MethodNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodNode")
            .field("fqn", &self.fully_qualified_name())
            .field("viewed_from", &self.viewed_from.qualified_name())
            .finish()
    }
}

/// The wrapped raw entity of a [`SyntaxNode`].
#[derive(Debug, Clone, Copy)]
pub enum RawNode<'a> {
    /// A type declaration.
    Type(&'a TypeDecl),
    /// A method declaration.
    Method(&'a MethodDecl),
}

/// Any node a rule can be evaluated against.
#[derive(Debug, Clone)]
pub enum SyntaxNode<'a> {
    /// A class, interface, or trait.
    Type(TypeNode<'a>),
    /// A method.
    Method(MethodNode<'a>),
}

impl<'a> SyntaxNode<'a> {
    /// Short name as written.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Self::Type(t) => t.name(),
            Self::Method(m) => m.name(),
        }
    }

    /// Fully qualified name.
    #[must_use]
    pub fn fully_qualified_name(&self) -> &str {
        match self {
            Self::Type(t) => t.fully_qualified_name(),
            Self::Method(m) => m.fully_qualified_name(),
        }
    }

    /// File the node was declared in.
    #[must_use]
    pub fn file(&self) -> &'a Path {
        match self {
            Self::Type(t) => t.file(),
            Self::Method(m) => m.file(),
        }
    }

    /// Location of the node's name.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Type(t) => t.span(),
            Self::Method(m) => m.span(),
        }
    }

    /// Types are always declarations; see [`MethodNode::is_declaration`].
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        match self {
            Self::Type(_) => true,
            Self::Method(m) => m.is_declaration(),
        }
    }

    /// See [`TypeNode::has_suppression_for`] and [`MethodNode::has_suppression_for`].
    #[must_use]
    pub fn has_suppression_for(&self, rule: &str) -> bool {
        match self {
            Self::Type(t) => t.has_suppression_for(rule),
            Self::Method(m) => m.has_suppression_for(rule),
        }
    }

    /// Forwards a capability query to the wrapped entity.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::NoSuchCapability`] when the node kind doesn't
    /// support `capability`.
    pub fn query(&self, capability: Capability) -> Result<CapabilityValue<'a>, NodeError> {
        match self {
            Self::Type(t) => t.query(capability),
            Self::Method(m) => m.query(capability),
        }
    }

    /// Returns the wrapped raw entity.
    #[must_use]
    pub fn as_raw(&self) -> RawNode<'a> {
        match self {
            Self::Type(t) => RawNode::Type(t.as_raw()),
            Self::Method(m) => RawNode::Method(m.as_raw()),
        }
    }
}

fn text_or_absent(text: Option<&str>) -> CapabilityValue<'_> {
    text.map_or(CapabilityValue::Absent, CapabilityValue::Text)
}

fn has_attribute(attributes: &[String], name: &str) -> bool {
    let wanted = name.trim_start_matches('\\');
    attributes
        .iter()
        .any(|a| a.trim_start_matches('\\').eq_ignore_ascii_case(wanted))
}
