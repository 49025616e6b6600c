use crate::commands::load_document;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use workbench_editor::{EditSession, Mutation, WorkbenchState};
use workbench_model::IdGenerator;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Schema file to edit
    pub schema: PathBuf,

    /// JSON array of mutation commands
    pub commands: PathBuf,

    /// Workbench state that gates the commands
    #[arg(short, long, default_value = "blueprint")]
    pub state: WorkbenchState,

    /// Save to this path instead of overwriting the schema
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report what would change without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = std::fs::read_to_string(&args.commands)
        .with_context(|| format!("Failed to read {}", args.commands.display()))?;
    let commands: Vec<Mutation> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid command list {}", args.commands.display()))?;

    let document = load_document(&args.schema)?;
    let mut session = EditSession::new("cli", document, IdGenerator::new(&config.protocol_name));
    session.set_state(args.state);

    println!(
        "🔧 {} {} commands ({})",
        "Applying".green().bold(),
        commands.len(),
        args.state
    );
    let summary = run_commands(&mut session, commands, &args.commands.display().to_string());

    println!();
    println!("   Applied:   {}", summary.applied);
    println!("   Unchanged: {}", summary.unchanged);
    if summary.rejected > 0 {
        println!("   {} {}", "Rejected:".red(), summary.rejected);
    }

    if args.dry_run || summary.applied == 0 {
        return Ok(());
    }

    let document = session.document_mut();
    match &args.output {
        Some(output) => document.save_as(output)?,
        None => document.save()?,
    }
    println!(
        "   {} Saved {}",
        "✓".green(),
        document
            .path
            .as_deref()
            .unwrap_or(args.schema.as_path())
            .display()
    );
    Ok(())
}

/// Run commands as one undoable batch, reporting each outcome
pub fn run_commands(session: &mut EditSession, commands: Vec<Mutation>, label: &str) -> ApplySummary {
    let mut summary = ApplySummary::default();

    session.begin_batch(&format!("Apply {}", label));
    for (index, command) in commands.into_iter().enumerate() {
        let name = command.label();
        match session.try_dispatch(command) {
            Ok(true) => {
                summary.applied += 1;
                println!("  {} #{} {}", "✓".green(), index, name);
            }
            Ok(false) => {
                summary.unchanged += 1;
                println!("  {} #{} {} (no change)", "·".dimmed(), index, name);
            }
            Err(err) => {
                summary.rejected += 1;
                println!("  {} #{} {}: {}", "✗".red(), index, name, err);
            }
        }
    }
    session.end_batch();

    summary
}
