//! Compile results and operation documents.

use crate::error::CompileError;
use crate::value::Value;
use serde::Serialize;

/// Output of one compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compiled {
    /// The root selection set, starting with `{`.
    pub body: String,
    /// Variables in first-encounter order.
    pub variables: Vec<Variable>,
    /// Fragment definitions in registration order. A fragment always comes
    /// after the fragments it spreads.
    pub fragments: Vec<Fragment>,
}

/// A variable collected from argument placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub declared_type: Option<String>,
    /// Field paths (`/`-joined) of every argument using this variable.
    pub usage_paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Variable {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A named fragment extracted from a reused shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub name: String,
    pub target_type: String,
    /// Full definition: `fragment Name on Type{...}`.
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

impl Compiled {
    /// Assemble a full operation document: fragment definitions first, then
    /// the operation with its variable declarations and the body.
    pub fn to_document(&self, kind: OperationKind, name: Option<&str>) -> Result<String, CompileError> {
        let mut doc = String::new();
        for fragment in &self.fragments {
            doc.push_str(&fragment.body);
            doc.push('\n');
        }

        doc.push_str(kind.keyword());
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            doc.push(' ');
            doc.push_str(name);
        }

        if !self.variables.is_empty() {
            let mut declarations = Vec::with_capacity(self.variables.len());
            for variable in &self.variables {
                let ty = variable
                    .declared_type
                    .as_deref()
                    .ok_or_else(|| CompileError::MissingVariableType {
                        name: variable.name.clone(),
                    })?;
                let mut declaration = format!("${}: {}", variable.name, ty);
                if let Some(default) = &variable.default {
                    declaration.push_str(" = ");
                    declaration.push_str(&default.to_default());
                }
                declarations.push(declaration);
            }
            doc.push('(');
            doc.push_str(&declarations.join(", "));
            doc.push(')');
        }

        doc.push(' ');
        doc.push_str(&self.body);
        Ok(doc)
    }

    pub fn to_query_document(&self, name: Option<&str>) -> Result<String, CompileError> {
        self.to_document(OperationKind::Query, name)
    }

    pub fn to_mutation_document(&self, name: Option<&str>) -> Result<String, CompileError> {
        self.to_document(OperationKind::Mutation, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, ty: Option<&str>, default: Option<Value>) -> Variable {
        Variable {
            name: name.to_string(),
            declared_type: ty.map(str::to_string),
            usage_paths: vec!["items".to_string()],
            default,
        }
    }

    #[test]
    fn bare_query() {
        let compiled = Compiled {
            body: "{\n  id\n}".to_string(),
            variables: vec![],
            fragments: vec![],
        };
        assert_eq!(compiled.to_query_document(None).unwrap(), "query {\n  id\n}");
        assert_eq!(
            compiled.to_mutation_document(Some("Touch")).unwrap(),
            "mutation Touch {\n  id\n}"
        );
    }

    #[test]
    fn variables_and_fragments() {
        let compiled = Compiled {
            body: "{\n  items(first: $first){ ...Item }\n}".to_string(),
            variables: vec![
                variable("first", Some("Int!"), None),
                variable("order", Some("Order"), Some(Value::Enum("DESC".to_string()))),
                variable("after", Some("String"), Some(Value::Null)),
            ],
            fragments: vec![Fragment {
                name: "Item".to_string(),
                target_type: "Item".to_string(),
                body: "fragment Item on Item{\n  id\n}".to_string(),
            }],
        };
        assert_eq!(
            compiled.to_query_document(Some("Items")).unwrap(),
            "fragment Item on Item{\n  id\n}\nquery Items($first: Int!, $order: Order = DESC, $after: String = null) {\n  items(first: $first){ ...Item }\n}"
        );
    }

    #[test]
    fn untyped_variable_cannot_be_declared() {
        let compiled = Compiled {
            body: "{\n  list(query: $list_query)\n}".to_string(),
            variables: vec![variable("list_query", None, None)],
            fragments: vec![],
        };
        let err = compiled.to_query_document(None).unwrap_err();
        assert!(matches!(err, CompileError::MissingVariableType { name } if name == "list_query"));
    }

    #[test]
    fn has_default() {
        assert!(variable("a", Some("Int"), Some(Value::Int(1))).has_default());
        assert!(!variable("a", Some("Int"), None).has_default());
    }

    #[test]
    fn serializes_for_tooling() {
        let compiled = Compiled {
            body: "{\n  id\n}".to_string(),
            variables: vec![variable("id", Some("ID!"), None)],
            fragments: vec![],
        };
        let json = serde_json::to_value(&compiled).unwrap();
        assert_eq!(json["variables"][0]["declared_type"], "ID!");
        assert_eq!(json["variables"][0]["usage_paths"][0], "items");
        assert!(json["variables"][0].get("default").is_none());
    }
}
