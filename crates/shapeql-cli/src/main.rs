mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// shapeql — compile shape catalogs into GraphQL documents
#[derive(Debug, Parser)]
#[command(name = "shapeql", version, about)]
struct Cli {
    /// Output format. Auto-detected if not specified (human for terminal, json for pipe).
    #[arg(long, global = true)]
    format: Option<output::Format>,

    /// Indent unit for generated documents (overrides $SHAPEQL_INDENT; `\t` for tabs).
    #[arg(long, global = true)]
    indent: Option<String>,

    /// Log compilation steps to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a catalog into an operation document.
    Compile(commands::compile::CompileArgs),
    /// List the variables a catalog's document declares.
    Variables(commands::variables::VariablesArgs),
    /// List the fragments a catalog's document defines.
    Fragments(commands::fragments::FragmentsArgs),
    /// Print a compact command reference.
    Usage,
}

/// Environment variable consulted when `--indent` is not given.
pub const INDENT_ENV: &str = "SHAPEQL_INDENT";

/// Indent precedence: `--indent` flag, then `$SHAPEQL_INDENT`, then the
/// library default.
fn resolve_indent(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(INDENT_ENV).ok())
        .map(|unit| unit.replace("\\t", "\t"))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = output::resolve_format(cli.format);

    if let Some(unit) = resolve_indent(cli.indent) {
        tracing::debug!(indent = ?unit, "using indent unit");
        shapeql::set_indent(unit);
    }

    let result = match cli.command {
        Command::Compile(args) => commands::compile::run(args, format),
        Command::Variables(args) => commands::variables::run(args, format),
        Command::Fragments(args) => commands::fragments::run(args, format),
        Command::Usage => {
            commands::usage::run();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
