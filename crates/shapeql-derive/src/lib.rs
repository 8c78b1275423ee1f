//! Derive macro for the `GraphQLShape` trait.
//!
//! Generates the shape description of a struct or enum from its definition.
//! The struct shape is the query shape.
//!
//! # Usage
//!
//! ```ignore
//! use shapeql::GraphQLShape;
//!
//! #[derive(GraphQLShape)]
//! #[graphql(name = "Issue")]
//! struct IssueRow {
//!     id: String,
//!     #[graphql(tag = "comments(first: $:Int!)")]
//!     comments: Vec<Comment>,
//!     #[serde(rename = "createdAt")]
//!     created: String,
//!     #[graphql(flatten)]
//!     meta: Meta,
//! }
//!
//! #[derive(GraphQLShape)]
//! enum SearchResult {
//!     Issue(IssueRow),
//!     Comment(Comment),
//! }
//! ```
//!
//! Field attributes:
//! - `#[graphql(tag = "...")]`: annotation naming the field and declaring
//!   arguments, aliases and markers.
//! - `#[graphql(flatten)]` / `#[serde(flatten)]`: splice the nested shape's
//!   fields into this one.
//! - `#[graphql(skip)]` / `#[serde(skip)]`: not part of the selection.
//! - `#[graphql(scalar)]`: select the field as a leaf whatever its type.
//! - `#[serde(rename = "...")]`: field name when there is no tag.
//!
//! Enums with single-field tuple variants describe unions: a `__typename`
//! discriminator plus one `... on Variant` branch per variant.

use heck::ToLowerCamelCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Expr, ExprLit, Fields,
    GenericParam, Lit, LitStr, Meta, Token, Type,
};

/// Derive `GraphQLType` and `GraphQLShape` for a struct or a union enum.
#[proc_macro_derive(GraphQLShape, attributes(graphql))]
pub fn derive_graphql_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "GraphQLShape cannot be derived for types with lifetime parameters",
        ));
    }

    let type_name = container_name(&input.attrs)?.unwrap_or_else(|| input.ident.to_string());
    let members = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => struct_members(named.named.iter())?,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "GraphQLShape can only be derived on structs with named fields",
                ));
            }
        },
        Data::Enum(data) => union_members(data.variants.iter())?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "GraphQLShape can only be derived on structs and enums",
            ));
        }
    };

    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(param) = param {
            param
                .bounds
                .push(parse_quote!(::shapeql::GraphQLType));
            param.bounds.push(parse_quote!('static));
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::shapeql::GraphQLType for #name #ty_generics #where_clause {
            fn type_ref() -> ::shapeql::TypeRef {
                ::shapeql::TypeRef::Shape(::shapeql::ShapeRef::of::<Self>())
            }
        }

        impl #impl_generics ::shapeql::GraphQLShape for #name #ty_generics #where_clause {
            fn shape() -> ::shapeql::Shape {
                ::shapeql::Shape {
                    id: ::std::any::type_name::<Self>().to_string(),
                    name: ::std::option::Option::Some(#type_name.to_string()),
                    members: ::std::vec![#(#members),*],
                }
            }
        }
    })
}

fn struct_members<'a>(
    fields: impl Iterator<Item = &'a syn::Field>,
) -> syn::Result<Vec<TokenStream2>> {
    let mut members = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // Embedded members are named after their type, like an anonymous
        // struct embedding; everything else after the field in camelCase.
        let ident = if attrs.flatten {
            type_ident(&field.ty)
        } else {
            let rust_name = field
                .ident
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let clean_name = rust_name.strip_prefix("r#").unwrap_or(&rust_name);
            clean_name.to_lower_camel_case()
        };

        let ty = &field.ty;
        let type_ref = if attrs.scalar {
            quote! { ::shapeql::TypeRef::Scalar }
        } else {
            quote! { <#ty as ::shapeql::GraphQLType>::type_ref() }
        };

        let mut member = quote! { ::shapeql::Member::new(#ident, #type_ref) };
        if let Some(tag) = &attrs.tag {
            member = quote! { #member.tag(#tag) };
        }
        if let Some(rename) = &attrs.rename {
            member = quote! { #member.fallback_name(#rename) };
        }
        if attrs.flatten {
            member = quote! { #member.embedded() };
        }
        members.push(member);
    }
    Ok(members)
}

fn union_members<'a>(
    variants: impl Iterator<Item = &'a syn::Variant>,
) -> syn::Result<Vec<TokenStream2>> {
    let mut members = vec![quote! {
        ::shapeql::Member::new("__typename", ::shapeql::TypeRef::Scalar).tag("__typename,union")
    }];
    for variant in variants {
        let attrs = FieldAttrs::parse(&variant.attrs)?;
        if attrs.skip {
            continue;
        }
        let ty = match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "union variants must wrap exactly one shape, like `Variant(Shape)`",
                ));
            }
        };
        let ident = variant.ident.to_string();
        members.push(quote! {
            ::shapeql::Member::new(#ident, <#ty as ::shapeql::GraphQLType>::type_ref()).embedded()
        });
    }
    Ok(members)
}

/// `#[graphql(name = "...")]` on the container.
fn container_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("graphql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown graphql container attribute; expected `name`"))
            }
        })?;
    }
    Ok(name)
}

#[derive(Default)]
struct FieldAttrs {
    tag: Option<String>,
    rename: Option<String>,
    flatten: bool,
    skip: bool,
    scalar: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("graphql") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("tag") {
                        let lit: LitStr = meta.value()?.parse()?;
                        out.tag = Some(lit.value());
                    } else if meta.path.is_ident("flatten") {
                        out.flatten = true;
                    } else if meta.path.is_ident("skip") {
                        out.skip = true;
                    } else if meta.path.is_ident("scalar") {
                        out.scalar = true;
                    } else {
                        return Err(meta.error(
                            "unknown graphql attribute; expected `tag`, `flatten`, `skip` or `scalar`",
                        ));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                // serde validates its own attributes; only the few that change
                // the selection are read here. Every item is visited, so an
                // option we don't know never hides the ones after it.
                let items =
                    attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                for item in items {
                    match item {
                        Meta::Path(path) if path.is_ident("flatten") => out.flatten = true,
                        Meta::Path(path) if path.is_ident("skip") => out.skip = true,
                        Meta::NameValue(pair) if pair.path.is_ident("rename") => {
                            let Expr::Lit(ExprLit {
                                lit: Lit::Str(lit), ..
                            }) = &pair.value
                            else {
                                return Err(syn::Error::new_spanned(
                                    &pair.value,
                                    "expected a string literal for serde `rename`",
                                ));
                            };
                            out.rename = Some(lit.value());
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Name of the innermost type: `Option<Box<Foo>>` → `Foo`.
fn type_ident(ty: &Type) -> String {
    match unwrap_type(ty) {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Unwrap wrapper types to get the "leaf" type.
/// `Option<Box<Foo>>` → `Foo`, `Vec<Bar>` → `Bar`, `Option<Vec<Baz>>` → `Baz`, etc.
fn unwrap_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let ident = segment.ident.to_string();
            if ident == "Option" || ident == "Vec" || ident == "Box" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return unwrap_type(inner);
                    }
                }
            }
        }
    }
    ty
}
