//! Error types for shape compilation.
//!
//! [`CompileError`] covers annotation decoding, cyclic shapes, malformed
//! unions, variable conflicts and document assembly. Every variant is
//! terminal: a compile either succeeds completely or returns the first error.

use crate::tag::DecodeError;
use std::fmt;

/// Errors that can occur while compiling a shape into a document.
#[derive(Debug)]
pub enum CompileError {
    /// No root shape was given, or the root has no visible members.
    NilInput,
    /// A member annotation could not be decoded.
    Decode {
        shape: String,
        field: String,
        source: DecodeError,
    },
    /// A shape refers back to itself through the listed chain of shape ids.
    CyclicReference { cycle: Vec<String> },
    /// A union branch points at a shape with no name to put after `... on`.
    AnonymousUnionMember { field: String, path: String },
    /// A union branch is not a structured shape.
    InvalidUnionMember {
        field: String,
        shape: String,
        path: String,
    },
    /// The same variable name was used with two different declared types.
    VariableTypeConflict {
        name: String,
        expected: Option<String>,
        found: Option<String>,
        path: String,
    },
    /// An explicit variable name collides with a synthesized one.
    VariableNameCollision { name: String, path: String },
    /// An alias was put on a union discriminator.
    AliasedDiscriminator { shape: String, field: String },
    /// A variable has no declared type at assembly time.
    MissingVariableType { name: String },
}

fn or_untyped(ty: &Option<String>) -> &str {
    ty.as_deref().unwrap_or("<untyped>")
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilInput => write!(f, "Nothing to compile: no root shape with visible members"),
            Self::Decode {
                shape,
                field,
                source,
            } => write!(
                f,
                "Invalid annotation on field [{}] of {}: {}",
                field, shape, source
            ),
            Self::CyclicReference { cycle } => {
                write!(f, "Cyclic reference: {}", cycle.join(" -> "))
            }
            Self::AnonymousUnionMember { field, path } => write!(
                f,
                "Union member [{}] at {} is an anonymous shape; union branches need a type name",
                field, path
            ),
            Self::InvalidUnionMember { field, shape, path } => write!(
                f,
                "Union member [{}] of {} at {} must be a structured shape",
                field, shape, path
            ),
            Self::VariableTypeConflict {
                name,
                expected,
                found,
                path,
            } => write!(
                f,
                "Variable ${} at {} is declared as {} but was first declared as {}",
                name,
                path,
                or_untyped(found),
                or_untyped(expected)
            ),
            Self::VariableNameCollision { name, path } => write!(
                f,
                "Variable ${} at {} collides with a variable of the same name from another source",
                name, path
            ),
            Self::AliasedDiscriminator { shape, field } => write!(
                f,
                "Union discriminator [{}] of {} cannot carry an alias",
                field, shape
            ),
            Self::MissingVariableType { name } => {
                write!(f, "Variable ${} has no declared type", name)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}
