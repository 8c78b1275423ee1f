use clap::Args;
use serde::Serialize;
use shapeql::{Compiled, OperationKind};
use std::path::PathBuf;

use super::helpers::compile_catalog;
use crate::output::{self, Format};

/// Compile a catalog into an operation document.
///
/// Examples:
///   shapeql compile shop.json
///   shapeql compile shop.toml --name Shop --indent '\t'
///   shapeql compile create.json --mutation --name CreateItem
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Catalog file (.json or .toml).
    pub file: PathBuf,
    /// Emit a mutation instead of a query.
    #[arg(long, short)]
    pub mutation: bool,
    /// Operation name.
    #[arg(long, short)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompileOutput<'a> {
    document: String,
    #[serde(flatten)]
    compiled: &'a Compiled,
}

pub fn run(args: CompileArgs, format: Format) -> anyhow::Result<()> {
    let compiled = compile_catalog(&args.file)?;
    let kind = if args.mutation {
        OperationKind::Mutation
    } else {
        OperationKind::Query
    };
    let document = compiled.to_document(kind, args.name.as_deref())?;

    match format {
        Format::Human => println!("{}", document),
        Format::Json => output::print_json(&CompileOutput {
            document,
            compiled: &compiled,
        })?,
    }
    Ok(())
}
