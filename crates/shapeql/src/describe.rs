//! Type-driven shape descriptions.
//!
//! Each type that implements [`GraphQLShape`] knows how to describe its own
//! members. The struct shape *is* the query shape: fields become selections,
//! nested shapes become nested selection sets, and per-field annotations carry
//! names, aliases, arguments and inline/union markers.
//!
//! Descriptions are lazy. A field that points at another shape holds a
//! [`ShapeRef`], which only builds the target description when the extractor
//! asks for it, so a self-referential type can be described (and is then
//! rejected as cyclic) instead of recursing forever.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Identity key of a shape. Two references to the same underlying shape
/// carry equal ids.
pub type ShapeId = String;

/// One distinct structured shape.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    /// Target type name (`... on Name`). `None` for anonymous shapes.
    pub name: Option<String>,
    /// Visible members in declaration order.
    pub members: Vec<Member>,
}

/// One visible member of a [`Shape`].
#[derive(Debug, Clone)]
pub struct Member {
    /// Declared name, used when nothing else names the field.
    pub ident: String,
    /// Raw annotation, see [`crate::tag`].
    pub tag: Option<String>,
    /// Serialization rename; only consulted when there is no tag.
    pub fallback_name: Option<String>,
    /// Anonymous embedding. Embedded members are always inline.
    pub embedded: bool,
    pub ty: TypeRef,
}

impl Member {
    pub fn new(ident: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            ident: ident.into(),
            tag: None,
            fallback_name: None,
            embedded: false,
            ty,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn fallback_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_name = Some(name.into());
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// The declared type of a member.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Scalar,
    Shape(ShapeRef),
    Optional(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    /// Strip every `Optional`/`List` wrapper and return the shape, if any.
    pub fn shape(&self) -> Option<&ShapeRef> {
        match self {
            TypeRef::Scalar => None,
            TypeRef::Shape(shape) => Some(shape),
            TypeRef::Optional(inner) | TypeRef::List(inner) => inner.shape(),
        }
    }
}

/// Lazy, cheaply clonable handle to a shape description.
#[derive(Clone)]
pub struct ShapeRef(Arc<dyn Fn() -> Shape + Send + Sync>);

impl ShapeRef {
    pub fn new(describe: impl Fn() -> Shape + Send + Sync + 'static) -> Self {
        Self(Arc::new(describe))
    }

    /// Handle for a type implementing [`GraphQLShape`].
    pub fn of<T: GraphQLShape + ?Sized + 'static>() -> Self {
        Self::new(T::shape)
    }

    pub fn resolve(&self) -> Shape {
        (self.0)()
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShapeRef(..)")
    }
}

/// Trait implemented by every type that can appear as a field.
///
/// Scalars report [`TypeRef::Scalar`], wrappers report their wrapping, and
/// shapes (usually via `#[derive(GraphQLShape)]`) report
/// [`TypeRef::Shape`].
pub trait GraphQLType {
    fn type_ref() -> TypeRef;
}

/// Trait implemented by types that describe a structured shape.
///
/// # Example
///
/// ```
/// use shapeql::GraphQLShape;
///
/// #[derive(GraphQLShape)]
/// struct Item {
///     id: String,
/// }
///
/// #[derive(GraphQLShape)]
/// struct Query {
///     #[graphql(tag = "items(first: 10)")]
///     items: Vec<Item>,
/// }
///
/// let compiled = shapeql::compile::<Query>().unwrap();
/// assert!(compiled.body.contains("items(first: 10)"));
/// ```
pub trait GraphQLShape: GraphQLType {
    fn shape() -> Shape;
}

macro_rules! scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GraphQLType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Scalar
                }
            }
        )*
    };
}

scalar!(
    String,
    &str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::NaiveTime,
);

// DateTime serializes as an ISO 8601 string.
impl<Tz: chrono::TimeZone> GraphQLType for chrono::DateTime<Tz> {
    fn type_ref() -> TypeRef {
        TypeRef::Scalar
    }
}

impl<T: GraphQLType> GraphQLType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::Optional(Box::new(T::type_ref()))
    }
}

impl<T: GraphQLType> GraphQLType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::List(Box::new(T::type_ref()))
    }
}

impl<T: GraphQLType, const N: usize> GraphQLType for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::List(Box::new(T::type_ref()))
    }
}

// Smart pointers are transparent.
impl<T: GraphQLType + ?Sized> GraphQLType for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: GraphQLType + ?Sized> GraphQLType for Arc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: GraphQLType + ?Sized> GraphQLType for Rc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}
