use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use super::helpers::compile_catalog;
use crate::output::{self, Format};

/// List the variables a catalog's document declares.
///
/// Examples:
///   shapeql variables shop.json
#[derive(Debug, Args)]
pub struct VariablesArgs {
    /// Catalog file (.json or .toml).
    pub file: PathBuf,
}

#[derive(Debug, Serialize, Tabled)]
pub struct VariableRow {
    pub name: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    pub declared_type: String,
    pub default: String,
    #[tabled(rename = "used at")]
    pub usage: String,
}

pub fn run(args: VariablesArgs, format: Format) -> anyhow::Result<()> {
    let compiled = compile_catalog(&args.file)?;
    match format {
        Format::Json => output::print_json(&compiled.variables),
        Format::Human => {
            let rows: Vec<VariableRow> = compiled
                .variables
                .iter()
                .map(|v| VariableRow {
                    name: format!("${}", v.name),
                    declared_type: v.declared_type.clone().unwrap_or_default(),
                    default: v
                        .default
                        .as_ref()
                        .map(|d| d.to_default())
                        .unwrap_or_default(),
                    usage: v.usage_paths.join(", "),
                })
                .collect();
            output::print_table(&rows, format)
        }
    }
}
