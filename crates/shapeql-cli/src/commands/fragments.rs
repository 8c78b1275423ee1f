use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use super::helpers::compile_catalog;
use crate::output::{self, Format};

/// List the fragments a catalog's document defines.
///
/// Examples:
///   shapeql fragments shop.json
///   shapeql fragments shop.json --format json
#[derive(Debug, Args)]
pub struct FragmentsArgs {
    /// Catalog file (.json or .toml).
    pub file: PathBuf,
}

#[derive(Debug, Serialize, Tabled)]
pub struct FragmentRow {
    pub name: String,
    #[tabled(rename = "on")]
    pub target_type: String,
}

pub fn run(args: FragmentsArgs, format: Format) -> anyhow::Result<()> {
    let compiled = compile_catalog(&args.file)?;
    match format {
        Format::Json => output::print_json(&compiled.fragments),
        Format::Human => {
            let rows: Vec<FragmentRow> = compiled
                .fragments
                .iter()
                .map(|f| FragmentRow {
                    name: f.name.clone(),
                    target_type: f.target_type.clone(),
                })
                .collect();
            output::print_table(&rows, format)
        }
    }
}
