//! # Workbench Export
//!
//! Read-only projections of a schema forest, plus the way back in:
//!
//! - [`generate_document`]: nested key/value template with placeholder values
//! - [`export_schema`]: versioned envelope around the persisted forest
//! - [`import_schema`]: validate an envelope or bare block list and mint fresh ids

mod bundle;
mod import;
mod preview;

pub use bundle::{export_schema, ExportMetadata, SchemaExport, EXPORT_VERSION};
pub use import::{import_schema, infer_category, ImportError, ImportOutcome};
pub use preview::{document_key, generate_document, placeholder};
