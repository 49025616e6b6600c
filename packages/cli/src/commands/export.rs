use crate::commands::{load_document, write_output};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use workbench_export::export_schema;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Schema file to export
    pub input: PathBuf,

    /// Protocol name (overrides config)
    #[arg(short, long)]
    pub protocol: Option<String>,

    /// Write the envelope here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let protocol = args.protocol.unwrap_or(config.protocol_name);
    let document = load_document(&args.input)?;

    let envelope = export_schema(document.forest(), &protocol);
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&envelope)?)?;

    if let Some(output) = &args.output {
        println!(
            "  {} {} → {} ({} blocks, {} fields)",
            "✓".green(),
            args.input.display(),
            output.display(),
            envelope.metadata.block_count,
            envelope.metadata.total_fields
        );
    }
    Ok(())
}
