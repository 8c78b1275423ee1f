//! Compile Rust type shapes into GraphQL query documents.
//!
//! A type that derives [`GraphQLShape`] describes a selection set: each field
//! becomes a selection, nested shapes become nested selection sets, and the
//! `#[graphql(tag = "...")]` annotation controls names, aliases, arguments and
//! inline or union handling. Shapes used more than once are compiled into a
//! single named fragment.
//!
//! ```
//! use shapeql::GraphQLShape;
//!
//! #[derive(GraphQLShape)]
//! struct Viewer {
//!     login: String,
//! }
//!
//! #[derive(GraphQLShape)]
//! struct Query {
//!     viewer: Viewer,
//! }
//!
//! let compiled = shapeql::compile::<Query>().unwrap();
//! assert_eq!(compiled.body, "{\n  viewer{\n    login\n  }\n}");
//! assert_eq!(
//!     compiled.to_query_document(None).unwrap(),
//!     "query {\n  viewer{\n    login\n  }\n}"
//! );
//! ```

pub mod catalog;
pub mod compile;
pub mod describe;
pub mod document;
pub mod error;
pub mod extract;
pub mod graph;
pub mod settings;
pub mod tag;
pub mod value;

// Re-export key types at crate root for convenience.
pub use catalog::{Catalog, CatalogError};
pub use compile::Compiler;
pub use describe::{GraphQLShape, GraphQLType, Member, Shape, ShapeRef, TypeRef};
pub use document::{Compiled, Fragment, OperationKind, Variable};
pub use error::CompileError;
pub use settings::{indent, set_indent, CompileOptions};
pub use shapeql_derive::GraphQLShape;
pub use value::Value;

/// Compile the shape of `T` with the current process-wide settings.
pub fn compile<T: GraphQLShape + 'static>() -> Result<Compiled, CompileError> {
    compile_ref(Some(&ShapeRef::of::<T>()))
}

/// Compile a shape handle. `None` is reported as [`CompileError::NilInput`].
pub fn compile_ref(root: Option<&ShapeRef>) -> Result<Compiled, CompileError> {
    Compiler::new(CompileOptions::default()).compile(root)
}
