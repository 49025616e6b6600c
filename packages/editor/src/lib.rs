//! # Workbench Editor
//!
//! Editing engine for hierarchical protocol schemas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: SchemaNode, Forest, NodePatch        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: engine + session                    │
//! │  - Pure tree operations (Forest → Forest)   │
//! │  - Mutation commands with validation        │
//! │  - Workbench-state gating                   │
//! │  - Snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ linter / export: read-only projections      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Containment is source of truth**: parent links are derived
//! 2. **Persistent values**: every operation yields a new forest
//! 3. **Silent rejection**: invalid intents are no-ops, `try_*` forms explain why
//!
//! ## Usage
//!
//! ```rust,ignore
//! use workbench_editor::{DropPosition, EditSession, SchemaDocument};
//! use workbench_model::{Forest, IdGenerator, VariableLibrary};
//!
//! let library = VariableLibrary::builtin();
//! let mut session = EditSession::new(
//!     "local",
//!     SchemaDocument::new(Forest::new()),
//!     IdGenerator::new("Stroke Registry"),
//! );
//!
//! let demographics = session.add_section(Some("Demographics"), None).unwrap();
//! let age = session.add_variable(library.get("age").unwrap(), Some(&demographics));
//! ```

pub mod engine;
mod document;
mod errors;
mod mutations;
mod session;
mod undo_stack;
mod workbench;

pub use document::{DocumentStorage, SchemaDocument};
pub use errors::EditorError;
pub use mutations::{DropPosition, Mutation, MutationError};
pub use session::{EditSession, ListenerId};
pub use undo_stack::{MutationBatch, UndoStack};
pub use workbench::WorkbenchState;
