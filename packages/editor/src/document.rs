//! # Schema Document
//!
//! A `SchemaDocument` holds one protocol schema forest and its editing
//! state. Documents can be:
//! - **Memory-backed**: Temporary, for testing or in-memory operations
//! - **File-backed**: Persisted as a JSON array of nested blocks
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Rebuild → Edit → Save
//!   ↓       ↓        ↓      ↓
//! JSON   Forest  Mutations JSON
//! ```

use crate::{EditorError, Mutation, MutationError};
use std::path::{Path, PathBuf};
use tracing::info;
use workbench_model::{Forest, PersistedNode};

/// Editable schema document
#[derive(Debug)]
pub struct SchemaDocument {
    /// Path to the backing file (if any)
    pub path: Option<PathBuf>,

    /// Current version number (increments on each change)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, temp docs)
    Memory { forest: Forest },

    /// File-backed
    File { forest: Forest, dirty: bool },
}

impl SchemaDocument {
    /// Create a memory-backed document
    pub fn new(forest: Forest) -> Self {
        Self {
            path: None,
            version: 0,
            storage: DocumentStorage::Memory { forest },
        }
    }

    /// Parse persisted JSON text (memory-backed)
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        let roots: Vec<PersistedNode> = serde_json::from_str(source)?;
        Ok(Self::new(Forest::from_persisted(roots)?))
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        let roots: Vec<PersistedNode> = serde_json::from_str(&source)?;
        let forest = Forest::from_persisted(roots)?;

        info!(path = %path.display(), nodes = forest.len(), "Loaded schema document");

        Ok(Self {
            path: Some(path),
            version: 0,
            storage: DocumentStorage::File {
                forest,
                dirty: false,
            },
        })
    }

    /// Current forest (cheap to clone)
    pub fn forest(&self) -> &Forest {
        match &self.storage {
            DocumentStorage::Memory { forest } => forest,
            DocumentStorage::File { forest, .. } => forest,
        }
    }

    /// Swap in a new forest. Returns false when nothing changed.
    pub fn replace(&mut self, next: Forest) -> bool {
        let (forest, dirty) = match &mut self.storage {
            DocumentStorage::Memory { forest } => (forest, None),
            DocumentStorage::File { forest, dirty } => (forest, Some(dirty)),
        };
        if forest.ptr_eq(&next) {
            return false;
        }

        *forest = next;
        if let Some(dirty) = dirty {
            *dirty = true;
        }
        self.version += 1;
        true
    }

    /// Apply a mutation directly, bypassing history and gating
    pub fn apply(&mut self, mutation: &Mutation) -> Result<bool, MutationError> {
        let next = mutation.try_apply(self.forest())?;
        Ok(self.replace(next))
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Persisted JSON text for the current forest
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.forest().to_persisted())?)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let json = self.to_json()?;
        match (&mut self.storage, &self.path) {
            (DocumentStorage::File { dirty, .. }, Some(path)) => {
                std::fs::write(path, json)?;
                *dirty = false;
                info!(path = %path.display(), version = self.version, "Saved schema document");
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }

    /// Write to `path` and make the document file-backed there
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let forest = self.forest().clone();
        self.path = Some(path.as_ref().to_path_buf());
        self.storage = DocumentStorage::File {
            forest,
            dirty: true,
        };
        self.save()
    }
}
