//! Selection-set compilation.
//!
//! Walks a [`TypeGraph`] depth-first and renders the query body. Shapes used
//! from more than one field are compiled once into a named fragment and
//! referenced by spread everywhere else. Variable arguments are collected into
//! a table keyed by variable name, with every usage path recorded.

use crate::describe::ShapeRef;
use crate::document::{Compiled, Fragment, Variable};
use crate::error::CompileError;
use crate::extract::extract;
use crate::graph::{Argument, FieldKind, FieldNode, NodeId, TypeGraph, TypeNode, TYPENAME};
use crate::settings::{CompileOptions, Indent};
use crate::value::Value;
use heck::ToSnakeCase;
use indexmap::IndexMap;

/// Compiles shapes into [`Compiled`] documents.
///
/// The compiler itself holds only options; every call to
/// [`Compiler::compile`] builds fresh extraction and compilation state.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Extract and compile the shape behind `root`.
    ///
    /// Fails with [`CompileError::NilInput`] when `root` is `None` or the root
    /// shape has no visible members.
    pub fn compile(&self, root: Option<&ShapeRef>) -> Result<Compiled, CompileError> {
        let root = root.ok_or(CompileError::NilInput)?;
        let graph = extract(root)?;
        self.compile_graph(&graph)
    }

    /// Compile an already extracted graph.
    pub fn compile_graph(&self, graph: &TypeGraph) -> Result<Compiled, CompileError> {
        let root = graph.root().ok_or(CompileError::NilInput)?;
        let mut state = SelectionCompiler::new(graph, &self.options.indent);
        let is_union = graph.node(root).is_union;
        let body = state.selection_set(root, false, is_union, 0)?;
        Ok(state.finish(body))
    }
}

/// Fragment name for a shape id: the id is split on anything that cannot
/// appear in an identifier, and the segments are joined with only their
/// first character uppercased. `main.HTTPServer` becomes `MainHTTPServer`.
pub fn fragment_name(id: &str) -> String {
    id.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

struct VariableSlot {
    variable: Variable,
    explicit: bool,
}

struct SelectionCompiler<'g> {
    graph: &'g TypeGraph,
    indent: Indent,
    fragments: IndexMap<String, Fragment>,
    variables: IndexMap<String, VariableSlot>,
    path: Vec<String>,
}

impl<'g> SelectionCompiler<'g> {
    fn new(graph: &'g TypeGraph, indent: &str) -> Self {
        Self {
            graph,
            indent: Indent::new(indent),
            fragments: IndexMap::new(),
            variables: IndexMap::new(),
            path: Vec::new(),
        }
    }

    fn finish(self, body: String) -> Compiled {
        Compiled {
            body,
            variables: self.variables.into_values().map(|s| s.variable).collect(),
            fragments: self.fragments.into_values().collect(),
        }
    }

    /// Render the selection set of `id`.
    ///
    /// `inline` splices the fields without braces; `union_member` forces the
    /// braces back for `... on Type { }` branches. `level` is the nesting
    /// depth of the enclosing field.
    fn selection_set(
        &mut self,
        id: NodeId,
        inline: bool,
        union_member: bool,
        level: usize,
    ) -> Result<String, CompileError> {
        let graph = self.graph;
        let node = graph.node(id);
        let mut level = level;

        if node.reuse_count > 1 {
            if let Some(fragment) = self.fragments.get(&node.id) {
                let name = fragment.name.clone();
                tracing::trace!(shape = %node.id, fragment = %name, "spreading fragment");
                return Ok(if inline && !union_member {
                    format!("\n{}...{}", self.indent.at(level + 1), name)
                } else {
                    format!("{{ ...{} }}", name)
                });
            }
            // A fragment body starts at the left margin.
            if !inline || union_member {
                level = 0;
            }
        }

        let braced = !inline || union_member;
        let mut buf = String::new();
        if braced {
            buf.push('{');
        }

        let depth = self.path.len();
        let walked = self.fields(node, level, &mut buf);
        self.path.truncate(depth);
        walked?;

        if !braced {
            return Ok(buf);
        }
        buf.push('\n');
        buf.push_str(self.indent.at(level));
        buf.push('}');

        if node.reuse_count > 1 {
            let name = self.unique_fragment_name(&node.id);
            let target_type = node.name.clone().unwrap_or_else(|| name.clone());
            tracing::debug!(shape = %node.id, fragment = %name, "registered fragment");
            let spread = format!("{{ ...{} }}", name);
            self.fragments.insert(
                node.id.clone(),
                Fragment {
                    body: format!("fragment {} on {}{}", name, target_type, buf),
                    name,
                    target_type,
                },
            );
            return Ok(spread);
        }
        Ok(buf)
    }

    /// Distinct shapes can map to the same name (`main.item` and
    /// `main.Item`); later ones get a numeric suffix.
    fn unique_fragment_name(&self, id: &str) -> String {
        let base = fragment_name(id);
        let taken = |name: &str| self.fragments.values().any(|f| f.name == name);
        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !taken(&candidate) {
                tracing::debug!(shape = %id, fragment = %candidate, "fragment name already taken, using suffix");
                return candidate;
            }
            n += 1;
        }
    }

    fn fields(&mut self, node: &'g TypeNode, level: usize, buf: &mut String) -> Result<(), CompileError> {
        let depth = self.path.len();
        for field in &node.fields {
            self.path.truncate(depth);
            self.path.push(field.name.clone());

            if node.is_union {
                self.union_branch(node, field, level, buf)?;
                continue;
            }

            match field.kind {
                FieldKind::Inline(nested) => {
                    if let Some(nested) = nested {
                        let set = self.selection_set(nested, true, false, level)?;
                        buf.push_str(&set);
                    }
                }
                FieldKind::Scalar | FieldKind::Object(_) => {
                    buf.push('\n');
                    buf.push_str(self.indent.at(level + 1));
                    buf.push_str(&field.name);
                    let arguments = self.arguments(field)?;
                    buf.push_str(&arguments);
                    if let FieldKind::Object(Some(nested)) = field.kind {
                        let set = self.selection_set(nested, false, false, level + 1)?;
                        buf.push_str(&set);
                    }
                }
            }
        }
        Ok(())
    }

    fn union_branch(
        &mut self,
        node: &'g TypeNode,
        field: &FieldNode,
        level: usize,
        buf: &mut String,
    ) -> Result<(), CompileError> {
        buf.push('\n');
        buf.push_str(self.indent.at(level + 1));
        if field.name == TYPENAME {
            buf.push_str(&field.name);
            return Ok(());
        }

        let Some(member) = field.kind.nested() else {
            return Err(CompileError::InvalidUnionMember {
                field: field.name.clone(),
                shape: node.label().to_string(),
                path: self.path.join("/"),
            });
        };
        let graph = self.graph;
        let Some(target) = graph.node(member).name.as_deref() else {
            return Err(CompileError::AnonymousUnionMember {
                field: field.name.clone(),
                path: self.path.join("/"),
            });
        };
        buf.push_str("... on ");
        buf.push_str(target);
        buf.push(' ');
        let set = self.selection_set(member, field.kind.is_inline(), true, level + 1)?;
        buf.push_str(&set);
        Ok(())
    }

    /// Render the `(key: value, ...)` clause, or nothing when no argument
    /// produces output.
    fn arguments(&mut self, field: &FieldNode) -> Result<String, CompileError> {
        let mut parts = Vec::with_capacity(field.arguments.len());
        for (key, argument) in &field.arguments {
            let value = match argument {
                Argument::Literal { value } => value.to_literal(),
                Argument::Variable {
                    name,
                    declared_type,
                    default,
                } => {
                    let name = self.variable(key, name.as_deref(), declared_type, default)?;
                    format!("${}", name)
                }
            };
            if value.is_empty() {
                continue;
            }
            parts.push(format!("{}: {}", key, value));
        }
        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({})", parts.join(", ")))
    }

    /// Register a use of a variable and return its name.
    fn variable(
        &mut self,
        key: &str,
        explicit: Option<&str>,
        declared_type: &Option<String>,
        default: &Option<Value>,
    ) -> Result<String, CompileError> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => format!("{}_{}", self.path.join("_"), key)
                .replace(':', "_")
                .to_snake_case(),
        };
        let path = self.path.join("/");

        let Some(slot) = self.variables.get_mut(&name) else {
            tracing::debug!(variable = %name, path = %path, "new variable");
            self.variables.insert(
                name.clone(),
                VariableSlot {
                    variable: Variable {
                        name: name.clone(),
                        declared_type: declared_type.clone(),
                        usage_paths: vec![path],
                        default: default.clone(),
                    },
                    explicit: explicit.is_some(),
                },
            );
            return Ok(name);
        };

        if slot.explicit != explicit.is_some() {
            return Err(CompileError::VariableNameCollision { name, path });
        }
        if slot.variable.declared_type != *declared_type {
            return Err(CompileError::VariableTypeConflict {
                name,
                expected: slot.variable.declared_type.clone(),
                found: declared_type.clone(),
                path,
            });
        }
        tracing::debug!(variable = %name, path = %path, "reusing variable");
        slot.variable.usage_paths.push(path);
        Ok(name)
    }
}
