//! Shape catalogs: shape descriptions loaded from JSON or TOML.
//!
//! A catalog lets tooling compile documents without Rust types. Every named
//! shape gets the identity `namespace.Name`; an inline anonymous shape gets
//! `<parent id>.<field>`. Shapes are described lazily, so a recursive catalog
//! reaches the extractor and is rejected there as cyclic.

use crate::describe::{Member, Shape, ShapeRef, TypeRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub namespace: String,
    pub root: String,
    #[serde(default)]
    pub shapes: IndexMap<String, ShapeDef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShapeDef {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Type expression; omitted means scalar.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default)]
    pub embedded: bool,
    /// Inline anonymous shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Box<ShapeDef>>,
}

#[derive(Debug)]
pub enum CatalogError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    Toml(toml::de::Error),
    UnsupportedFormat { path: PathBuf },
    UnknownShape { name: String },
    InvalidType { shape: String, field: String, ty: String },
    ConflictingField { shape: String, field: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot read {}: {}", path.display(), source),
            Self::Json(e) => write!(f, "Invalid JSON catalog: {}", e),
            Self::Toml(e) => write!(f, "Invalid TOML catalog: {}", e),
            Self::UnsupportedFormat { path } => write!(
                f,
                "Unsupported catalog format for {} (expected .json or .toml)",
                path.display()
            ),
            Self::UnknownShape { name } => write!(f, "Unknown shape '{}'", name),
            Self::InvalidType { shape, field, ty } => write!(
                f,
                "Invalid type '{}' on field [{}] of {}",
                ty, field, shape
            ),
            Self::ConflictingField { shape, field } => write!(
                f,
                "Field [{}] of {} has both a type and an inline shape",
                field, shape
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            Self::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

/// A validated catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    file: Arc<CatalogFile>,
}

impl Catalog {
    pub fn new(file: CatalogFile) -> Result<Self, CatalogError> {
        validate(&file)?;
        Ok(Self {
            file: Arc::new(file),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        Self::new(toml::from_str(s)?)
    }

    /// Load a catalog, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self, CatalogError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => {
                return Err(CatalogError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded catalog");
        parse(&content)
    }

    pub fn namespace(&self) -> &str {
        &self.file.namespace
    }

    pub fn root_name(&self) -> &str {
        &self.file.root
    }

    pub fn shape_names(&self) -> impl Iterator<Item = &str> {
        self.file.shapes.keys().map(String::as_str)
    }

    /// Handle for the root shape.
    pub fn root(&self) -> ShapeRef {
        // The root is checked to exist when the catalog is built.
        let def = self.file.shapes.get(&self.file.root).cloned().unwrap_or_default();
        named_ref(&self.file, &self.file.root, def)
    }

    /// Handle for any named shape.
    pub fn shape_ref(&self, name: &str) -> Result<ShapeRef, CatalogError> {
        let def = self
            .file
            .shapes
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownShape {
                name: name.to_string(),
            })?;
        Ok(named_ref(&self.file, name, def))
    }
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
}

fn parse_type(s: &str) -> Option<TypeExpr> {
    let s = s.trim();
    if let Some(inner) = s.strip_suffix('?') {
        return parse_bare(inner).map(|t| TypeExpr::Optional(Box::new(t)));
    }
    parse_bare(s.strip_suffix('!').unwrap_or(s))
}

fn parse_bare(s: &str) -> Option<TypeExpr> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('[') {
        let inner = inner.strip_suffix(']')?;
        return parse_type(inner).map(|t| TypeExpr::List(Box::new(t)));
    }
    let mut chars = s.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| TypeExpr::Named(s.to_string()))
}

fn validate(file: &CatalogFile) -> Result<(), CatalogError> {
    if !file.shapes.contains_key(&file.root) {
        return Err(CatalogError::UnknownShape {
            name: file.root.clone(),
        });
    }
    for (name, def) in &file.shapes {
        validate_shape(name, def)?;
    }
    Ok(())
}

fn validate_shape(shape: &str, def: &ShapeDef) -> Result<(), CatalogError> {
    for field in &def.fields {
        if let Some(ty) = &field.ty {
            if field.shape.is_some() {
                return Err(CatalogError::ConflictingField {
                    shape: shape.to_string(),
                    field: field.name.clone(),
                });
            }
            if parse_type(ty).is_none() {
                return Err(CatalogError::InvalidType {
                    shape: shape.to_string(),
                    field: field.name.clone(),
                    ty: ty.clone(),
                });
            }
        }
        if let Some(inner) = &field.shape {
            validate_shape(&format!("{}.{}", shape, field.name), inner)?;
        }
    }
    Ok(())
}

fn shape_id(file: &CatalogFile, name: &str) -> String {
    if file.namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", file.namespace, name)
    }
}

fn named_ref(file: &Arc<CatalogFile>, name: &str, def: ShapeDef) -> ShapeRef {
    let file = Arc::clone(file);
    let name = name.to_string();
    ShapeRef::new(move || describe(&file, shape_id(&file, &name), Some(name.clone()), &def))
}

fn describe(file: &Arc<CatalogFile>, id: String, name: Option<String>, def: &ShapeDef) -> Shape {
    let members = def
        .fields
        .iter()
        .map(|field| {
            let ty = match (&field.shape, &field.ty) {
                (Some(inner), _) => {
                    let file = Arc::clone(file);
                    let inner_id = format!("{}.{}", id, field.name);
                    let inner = (**inner).clone();
                    TypeRef::Shape(ShapeRef::new(move || {
                        describe(&file, inner_id.clone(), None, &inner)
                    }))
                }
                (None, Some(ty)) => parse_type(ty)
                    .map(|expr| type_ref(file, &expr))
                    .unwrap_or(TypeRef::Scalar),
                (None, None) => TypeRef::Scalar,
            };
            let mut member = Member::new(field.name.clone(), ty);
            if let Some(tag) = &field.tag {
                member = member.tag(tag.clone());
            }
            if field.embedded {
                member = member.embedded();
            }
            member
        })
        .collect();
    Shape { id, name, members }
}

fn type_ref(file: &Arc<CatalogFile>, expr: &TypeExpr) -> TypeRef {
    match expr {
        TypeExpr::Named(name) => match file.shapes.get(name) {
            Some(def) => TypeRef::Shape(named_ref(file, name, def.clone())),
            None => TypeRef::Scalar,
        },
        TypeExpr::List(inner) => TypeRef::List(Box::new(type_ref(file, inner))),
        TypeExpr::Optional(inner) => TypeRef::Optional(Box::new(type_ref(file, inner))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;

    const SHOP: &str = r#"{
        "namespace": "main",
        "root": "Query",
        "shapes": {
            "Query": { "fields": [
                { "name": "items", "tag": "items(first: 10)", "type": "[Item!]!" },
                { "name": "meta", "embedded": true, "type": "Meta" },
                { "name": "extra", "shape": { "fields": [ { "name": "x" } ] } }
            ] },
            "Item": { "fields": [ { "name": "id", "type": "ID!" } ] },
            "Meta": { "fields": [ { "name": "total", "type": "Int" } ] }
        }
    }"#;

    #[test]
    fn json_catalog_compiles() {
        let catalog = Catalog::from_json_str(SHOP).unwrap();
        assert_eq!(catalog.namespace(), "main");
        assert_eq!(catalog.root_name(), "Query");
        let compiled = crate::compile_ref(Some(&catalog.root())).unwrap();
        assert_eq!(
            compiled.body,
            "{\n  items(first: 10){\n    id\n  }\n  total\n  extra{\n    x\n  }\n}"
        );
    }

    #[test]
    fn ids_carry_the_namespace() {
        let catalog = Catalog::from_json_str(SHOP).unwrap();
        let root = catalog.root().resolve();
        assert_eq!(root.id, "main.Query");
        assert_eq!(root.name.as_deref(), Some("Query"));
        let extra = root.members[2].ty.shape().unwrap().resolve();
        assert_eq!(extra.id, "main.Query.extra");
        assert_eq!(extra.name, None);
    }

    #[test]
    fn toml_catalog() {
        let catalog = Catalog::from_toml_str(
            r#"
            root = "Query"

            [[shapes.Query.fields]]
            name = "viewer"
            type = "User?"

            [[shapes.User.fields]]
            name = "login"
            tag = "login,alias=handle"
            "#,
        )
        .unwrap();
        let compiled = crate::compile_ref(Some(&catalog.root())).unwrap();
        assert_eq!(compiled.body, "{\n  viewer{\n    handle:login\n  }\n}");
        assert_eq!(catalog.root().resolve().id, "Query");
    }

    #[test]
    fn unknown_root() {
        let err = Catalog::from_json_str(r#"{ "root": "Nope", "shapes": {} }"#).unwrap_err();
        assert_eq!(err.to_string(), "Unknown shape 'Nope'");
    }

    #[test]
    fn malformed_type() {
        let err = Catalog::from_json_str(
            r#"{ "root": "Q", "shapes": { "Q": { "fields": [ { "name": "a", "type": "[Item" } ] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidType { ref ty, .. } if ty == "[Item"));
    }

    #[test]
    fn type_and_shape_conflict() {
        let err = Catalog::from_json_str(
            r#"{ "root": "Q", "shapes": { "Q": { "fields": [
                { "name": "a", "type": "Int", "shape": { "fields": [] } } ] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::ConflictingField { .. }));
    }

    #[test]
    fn recursive_catalog_is_a_cycle() {
        let catalog = Catalog::from_json_str(
            r#"{ "namespace": "t", "root": "Node", "shapes": { "Node": { "fields": [
                { "name": "id" }, { "name": "next", "type": "Node" } ] } } }"#,
        )
        .unwrap();
        let err = crate::compile_ref(Some(&catalog.root())).unwrap_err();
        assert!(matches!(err, CompileError::CyclicReference { .. }));
    }

    #[test]
    fn shape_ref_by_name() {
        let catalog = Catalog::from_json_str(SHOP).unwrap();
        assert_eq!(catalog.shape_ref("Item").unwrap().resolve().id, "main.Item");
        assert!(matches!(
            catalog.shape_ref("Missing"),
            Err(CatalogError::UnknownShape { .. })
        ));
        let names: Vec<&str> = catalog.shape_names().collect();
        assert_eq!(names, vec!["Query", "Item", "Meta"]);
    }

    #[test]
    fn type_expressions() {
        assert_eq!(parse_type("Int"), Some(TypeExpr::Named("Int".to_string())));
        assert_eq!(
            parse_type("[Item!]?"),
            Some(TypeExpr::Optional(Box::new(TypeExpr::List(Box::new(
                TypeExpr::Named("Item".to_string())
            )))))
        );
        assert_eq!(parse_type(""), None);
        assert_eq!(parse_type("9lives"), None);
        assert_eq!(parse_type("[A]]"), None);
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("shop.json");
        std::fs::write(&json, SHOP).unwrap();
        assert!(Catalog::load(&json).is_ok());

        let yaml = dir.path().join("shop.yaml");
        std::fs::write(&yaml, SHOP).unwrap();
        assert!(matches!(
            Catalog::load(&yaml),
            Err(CatalogError::UnsupportedFormat { .. })
        ));

        let missing = dir.path().join("missing.toml");
        let err = Catalog::load(&missing).unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }
}
