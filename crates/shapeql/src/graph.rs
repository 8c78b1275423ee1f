//! The extracted type graph.
//!
//! Nodes live in an arena owned by [`TypeGraph`] and refer to each other by
//! [`NodeId`]. Each distinct shape appears exactly once; shared shapes are
//! referenced from several fields and carry a `reuse_count` above one.

use crate::describe::ShapeId;
use crate::tag::ArgSpec;
use crate::value::Value;
use indexmap::IndexMap;

/// Name of the union discriminator field.
pub const TYPENAME: &str = "__typename";

/// Index of a node inside its [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// All distinct shapes reachable from one root.
#[derive(Debug, Default)]
pub struct TypeGraph {
    pub(crate) nodes: Vec<TypeNode>,
    pub(crate) root: Option<NodeId>,
}

impl TypeGraph {
    /// `None` when the root shape has no visible members.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.0]
    }

    /// Nodes in extraction order (children before parents).
    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by shape id.
    pub fn find(&self, id: &str) -> Option<&TypeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// One distinct shape.
#[derive(Debug)]
pub struct TypeNode {
    pub id: ShapeId,
    pub name: Option<String>,
    pub fields: Vec<FieldNode>,
    pub is_union: bool,
    /// Number of fields referencing this shape (1 for a single use).
    pub reuse_count: u32,
}

impl TypeNode {
    /// Name for messages: the type name, or the id for anonymous shapes.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One field of a [`TypeNode`].
#[derive(Debug)]
pub struct FieldNode {
    /// Output name, `alias:name` when aliased.
    pub name: String,
    pub kind: FieldKind,
    pub arguments: IndexMap<String, Argument>,
}

/// How a field contributes to its parent selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    /// Nested selection set under the field name. `None` when the nested
    /// shape has no visible members.
    Object(Option<NodeId>),
    /// Members spliced into the parent selection set.
    Inline(Option<NodeId>),
}

impl FieldKind {
    pub fn nested(&self) -> Option<NodeId> {
        match self {
            FieldKind::Scalar => None,
            FieldKind::Object(id) | FieldKind::Inline(id) => *id,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, FieldKind::Inline(_))
    }
}

/// One argument supplied on a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal {
        value: Value,
    },
    Variable {
        /// Explicit name; synthesized from the field path when `None`.
        name: Option<String>,
        declared_type: Option<String>,
        default: Option<Value>,
    },
}

impl From<ArgSpec> for Argument {
    fn from(spec: ArgSpec) -> Self {
        match spec {
            // The custom type on a literal is informational only.
            ArgSpec::Literal { value, .. } => Argument::Literal { value },
            ArgSpec::Variable {
                name,
                declared_type,
                default,
            } => Argument::Variable {
                name,
                declared_type,
                default,
            },
        }
    }
}
