//! Type graph extraction.
//!
//! Walks a shape description depth-first and produces a [`TypeGraph`]:
//! one node per distinct shape id, field names resolved from annotations,
//! union shapes classified, and reuse counted. A shape met again while it is
//! still being expanded is a cycle and aborts the extraction.

use crate::describe::{Member, Shape, ShapeId, ShapeRef};
use crate::error::CompileError;
use crate::graph::{Argument, FieldKind, FieldNode, NodeId, TypeGraph, TypeNode, TYPENAME};
use crate::tag::{self, Annotation};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Flags that never name a field.
const MARKER_FLAGS: &[&str] = &["inline", "union"];

/// Extract the graph rooted at `root`.
pub fn extract(root: &ShapeRef) -> Result<TypeGraph, CompileError> {
    let mut extractor = Extractor::default();
    let root = extractor.shape(root)?;
    Ok(TypeGraph {
        nodes: extractor.nodes,
        root,
    })
}

#[derive(Default)]
struct Extractor {
    nodes: Vec<TypeNode>,
    /// Fully extracted shapes; `None` for shapes without members.
    cache: HashMap<ShapeId, Option<NodeId>>,
    /// Shapes on the current expansion path, outermost first.
    in_progress: IndexSet<ShapeId>,
}

impl Extractor {
    fn shape(&mut self, shape_ref: &ShapeRef) -> Result<Option<NodeId>, CompileError> {
        let shape = shape_ref.resolve();

        if let Some(start) = self.in_progress.get_index_of(&shape.id) {
            let mut cycle: Vec<String> = self.in_progress.iter().skip(start).cloned().collect();
            cycle.push(shape.id);
            return Err(CompileError::CyclicReference { cycle });
        }

        if let Some(&cached) = self.cache.get(&shape.id) {
            if let Some(id) = cached {
                let node = &mut self.nodes[id.0];
                node.reuse_count += 1;
                tracing::debug!(shape = %node.id, reuse_count = node.reuse_count, "reusing shape");
            }
            return Ok(cached);
        }

        self.in_progress.insert(shape.id.clone());
        let fields = self.fields(&shape);
        self.in_progress.pop();
        let (fields, is_union) = fields?;

        if fields.is_empty() {
            tracing::debug!(shape = %shape.id, "shape has no visible members");
            self.cache.insert(shape.id, None);
            return Ok(None);
        }

        let id = NodeId(self.nodes.len());
        tracing::debug!(
            shape = %shape.id,
            fields = fields.len(),
            union = is_union,
            "extracted shape"
        );
        self.cache.insert(shape.id.clone(), Some(id));
        self.nodes.push(TypeNode {
            id: shape.id,
            name: shape.name,
            fields,
            is_union,
            reuse_count: 1,
        });
        Ok(Some(id))
    }

    fn fields(&mut self, shape: &Shape) -> Result<(Vec<FieldNode>, bool), CompileError> {
        let mut fields = Vec::with_capacity(shape.members.len());
        let mut is_union = false;
        for member in &shape.members {
            let annotation = match &member.tag {
                Some(tag) => Some(tag::decode(tag).map_err(|source| CompileError::Decode {
                    shape: shape.id.clone(),
                    field: member.ident.clone(),
                    source,
                })?),
                None => None,
            };
            let (name, discriminator) = field_name(shape, member, annotation.as_ref())?;
            is_union |= discriminator;

            let inline =
                member.embedded || annotation.as_ref().is_some_and(|a| a.has_flag("inline"));
            let kind = match member.ty.shape() {
                Some(nested) => {
                    let nested = self.shape(nested)?;
                    if inline {
                        FieldKind::Inline(nested)
                    } else {
                        FieldKind::Object(nested)
                    }
                }
                None if inline => FieldKind::Inline(None),
                None => FieldKind::Scalar,
            };
            tracing::trace!(shape = %shape.id, field = %name, ?kind, "resolved field");

            let arguments = annotation
                .map(|a| {
                    a.arguments
                        .into_iter()
                        .map(|(key, spec)| (key, Argument::from(spec)))
                        .collect()
                })
                .unwrap_or_default();
            fields.push(FieldNode {
                name,
                kind,
                arguments,
            });
        }
        Ok((fields, is_union))
    }
}

/// Resolve the output name of a member. The flag is true for a union
/// discriminator.
fn field_name(
    shape: &Shape,
    member: &Member,
    annotation: Option<&Annotation>,
) -> Result<(String, bool), CompileError> {
    let Some(annotation) = annotation else {
        let name = member
            .fallback_name
            .clone()
            .unwrap_or_else(|| member.ident.clone());
        return Ok((name, false));
    };

    let union = annotation.has_flag("union");
    let name = match &annotation.name {
        Some(name) => name.clone(),
        None if union => TYPENAME.to_string(),
        None => naming_flag(annotation).unwrap_or_else(|| member.ident.clone()),
    };
    let discriminator = union && name == TYPENAME;

    let alias = annotation
        .flag("alias")
        .and_then(|f| f.value.as_deref())
        .filter(|a| !a.is_empty());
    match alias {
        Some(_) if discriminator => Err(CompileError::AliasedDiscriminator {
            shape: shape.id.clone(),
            field: member.ident.clone(),
        }),
        Some(alias) => Ok((format!("{}:{}", alias, name), false)),
        None => Ok((name, discriminator)),
    }
}

/// The single boolean flag that is not a marker, if there is exactly one.
fn naming_flag(annotation: &Annotation) -> Option<String> {
    let mut candidates = annotation
        .flags
        .iter()
        .filter(|f| f.is_boolean() && !MARKER_FLAGS.contains(&f.name.as_str()));
    match (candidates.next(), candidates.next()) {
        (Some(flag), None) => Some(flag.name.clone()),
        _ => None,
    }
}
