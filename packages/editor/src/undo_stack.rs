//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Forests are persistent values, so each step keeps the snapshots
//!   before and after it (sharing every unchanged node)
//! - Undo restores the `before` snapshot, redo restores `after`
//! - Mutations that change nothing are not recorded
//! - New mutations clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! let forest = stack.apply(&mutation, &forest)?;
//! let previous = stack.undo().unwrap();
//! let again = stack.redo().unwrap();
//! ```

use crate::{Mutation, MutationError};
use workbench_model::Forest;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Forest before the first mutation
    pub before: Forest,

    /// Forest after the last mutation
    pub after: Forest,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, before: Forest, after: Forest) -> Self {
        Self {
            description: Some(mutation.label().to_string()),
            mutations: vec![mutation],
            before,
            after,
        }
    }

    /// Snapshot step with no command behind it (load, clear)
    pub fn snapshot(before: Forest, after: Forest) -> Self {
        Self {
            mutations: Vec::new(),
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for schema editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,

    /// Description requested before the batch's first mutation
    pending_description: Option<String>,

    batching: bool,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
            pending_description: None,
            batching: false,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, forest: &Forest) -> Result<Forest, MutationError> {
        let next = mutation.try_apply(forest)?;
        if !next.ptr_eq(forest) {
            self.record(mutation.clone(), forest.clone(), next.clone());
        }
        Ok(next)
    }

    /// Record a completed step
    pub fn record(&mut self, mutation: Mutation, before: Forest, after: Forest) {
        if self.batching {
            match &mut self.current_batch {
                Some(batch) => {
                    batch.mutations.push(mutation);
                    batch.after = after;
                }
                None => {
                    let mut batch = MutationBatch::single(mutation, before, after);
                    batch.description = self.pending_description.take().or(batch.description);
                    self.current_batch = Some(batch);
                }
            }
        } else {
            self.push_batch(MutationBatch::single(mutation, before, after));
        }
    }

    /// Record a whole-forest replacement that no command describes
    pub fn record_snapshot(&mut self, before: Forest, after: Forest, description: &str) {
        self.end_batch();
        self.push_batch(MutationBatch::snapshot(before, after).with_description(description));
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.batching = true;
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        self.batching = false;
        self.pending_description = None;
        if let Some(batch) = self.current_batch.take() {
            self.push_batch(batch);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if !self.batching {
            return;
        }
        match &mut self.current_batch {
            Some(batch) => batch.description = Some(description.into()),
            None => self.pending_description = Some(description.into()),
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent batch, returning the forest to restore
    pub fn undo(&mut self) -> Option<Forest> {
        self.end_batch();
        let batch = self.undo_stack.pop()?;
        let restored = batch.before.clone();
        self.redo_stack.push(batch);
        Some(restored)
    }

    /// Redo the most recently undone batch, returning the forest to restore
    pub fn redo(&mut self) -> Option<Forest> {
        let batch = self.redo_stack.pop()?;
        let restored = batch.after.clone();
        self.undo_stack.push(batch);
        Some(restored)
    }

    /// Forest that `undo` would restore, without changing the stack
    pub fn peek_undo(&self) -> Option<&Forest> {
        self.current_batch
            .as_ref()
            .or_else(|| self.undo_stack.last())
            .map(|batch| &batch.before)
    }

    /// Forest that `redo` would restore
    pub fn peek_redo(&self) -> Option<&Forest> {
        self.redo_stack.last().map(|batch| &batch.after)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.current_batch.is_some()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
        self.pending_description = None;
        self.batching = false;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
