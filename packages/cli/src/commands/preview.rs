use crate::commands::{load_document, write_output};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use workbench_export::generate_document;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Schema file to render
    pub input: PathBuf,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line output (overrides config)
    #[arg(long)]
    pub compact: bool,
}

/// Print the placeholder data document for a schema.
///
/// Values are type samples, not collected data.
pub fn preview(args: PreviewArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let document = load_document(&args.input)?;
    let template = generate_document(document.forest());

    let json = if config.preview.pretty && !args.compact {
        serde_json::to_string_pretty(&template)?
    } else {
        serde_json::to_string(&template)?
    };
    write_output(args.output.as_deref(), &json)?;

    if let Some(output) = &args.output {
        println!("  {} {} → {}", "✓".green(), args.input.display(), output.display());
    }
    Ok(())
}
