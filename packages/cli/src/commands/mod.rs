pub mod apply;
pub mod export;
pub mod import;
pub mod lint;
pub mod preview;

pub use apply::{apply, ApplyArgs};
pub use export::{export, ExportArgs};
pub use import::{import, ImportArgs};
pub use lint::{lint, LintArgs};
pub use preview::{preview, PreviewArgs};

use anyhow::{Context, Result};
use std::path::Path;
use workbench_editor::SchemaDocument;

/// Load a persisted schema file
pub(crate) fn load_document(path: &Path) -> Result<SchemaDocument> {
    SchemaDocument::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Write to `output`, or stdout when none is given
pub(crate) fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}
