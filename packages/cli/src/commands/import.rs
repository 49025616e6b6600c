use crate::commands::write_output;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use workbench_editor::SchemaDocument;
use workbench_export::import_schema;
use workbench_model::IdGenerator;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Exported envelope or bare block array
    pub input: PathBuf,

    /// Protocol name used to seed new ids (overrides config)
    #[arg(short, long)]
    pub protocol: Option<String>,

    /// Write the schema here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn import(args: ImportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let protocol = args.protocol.unwrap_or(config.protocol_name);
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut ids = IdGenerator::new(&protocol);
    let outcome = import_schema(&source, &mut ids)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    for error in &outcome.errors {
        eprintln!("  {} {}", "⚠".yellow(), error);
    }

    let document = SchemaDocument::new(outcome.forest);
    write_output(args.output.as_deref(), &document.to_json()?)?;

    if let Some(output) = &args.output {
        println!(
            "  {} {} → {} ({} blocks, {} skipped)",
            "✓".green(),
            args.input.display(),
            output.display(),
            document.forest().len(),
            outcome.errors.len()
        );
    }
    Ok(())
}
