mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, export, import, lint, preview, ApplyArgs, ExportArgs, ImportArgs, LintArgs, PreviewArgs,
};
use tracing_subscriber::EnvFilter;

/// Workbench CLI - protocol schema tooling
#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report blocks nested under sections they do not belong to
    Lint(LintArgs),

    /// Render the placeholder data document for a schema
    Preview(PreviewArgs),

    /// Wrap a schema in a versioned export envelope
    Export(ExportArgs),

    /// Rebuild a schema from an export, minting fresh ids
    Import(ImportArgs),

    /// Run a list of mutation commands against a schema file
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Lint(args) => lint(args, &cwd),
            Command::Preview(args) => preview(args, &cwd),
            Command::Export(args) => export(args, &cwd),
            Command::Import(args) => import(args, &cwd),
            Command::Apply(args) => apply(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
