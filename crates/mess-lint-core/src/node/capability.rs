//! Explicit capability interface for querying wrapped syntax entities.

use crate::ast::{TypeKind, Visibility};

/// A property a caller can ask a node for through [`SyntaxNode::query`].
///
/// This is the complete set of forwarded operations; anything a node kind
/// does not support fails with [`NodeError::NoSuchCapability`].
///
/// [`SyntaxNode::query`]: super::SyntaxNode::query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Short name as written.
    Name,
    /// Enclosing namespace (types only).
    Namespace,
    /// Declared kind (types only).
    TypeKind,
    /// First line of the name.
    StartLine,
    /// Last line of the name.
    EndLine,
    /// Raw doc comment, if any.
    DocComment,
    /// `abstract` modifier.
    IsAbstract,
    /// Declared visibility (methods only).
    Visibility,
    /// `static` modifier (methods only).
    IsStatic,
    /// Number of formal parameters (methods only).
    ParameterCount,
    /// Whether a body is present (methods only).
    HasBody,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Namespace => "namespace",
            Self::TypeKind => "type-kind",
            Self::StartLine => "start-line",
            Self::EndLine => "end-line",
            Self::DocComment => "doc-comment",
            Self::IsAbstract => "is-abstract",
            Self::Visibility => "visibility",
            Self::IsStatic => "is-static",
            Self::ParameterCount => "parameter-count",
            Self::HasBody => "has-body",
        };
        f.write_str(name)
    }
}

/// Answer to a capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityValue<'a> {
    /// Borrowed text from the syntax entity.
    Text(&'a str),
    /// A count or line number.
    Number(usize),
    /// A boolean flag.
    Flag(bool),
    /// A type kind.
    Kind(TypeKind),
    /// A member visibility.
    Visibility(Visibility),
    /// The capability is supported but the entity carries no value (e.g. no doc comment).
    Absent,
}

impl<'a> CapabilityValue<'a> {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a numeric value.
    #[must_use]
    pub fn as_number(&self) -> Option<usize> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// Errors raised by the node model.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodeError {
    /// The node kind does not support the requested capability.
    #[error("{node} does not support capability `{capability}`")]
    NoSuchCapability {
        /// The capability that was requested.
        capability: Capability,
        /// Fully qualified name of the queried node.
        node: String,
    },
}
