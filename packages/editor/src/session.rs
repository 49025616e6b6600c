//! # Edit Session Management
//!
//! An `EditSession` is the single writer of one schema document. Every
//! intent goes through the same path:
//!
//! ```text
//! intent → Mutation → workbench gate → engine → history → document → listeners
//! ```
//!
//! Rejected or no-op intents leave the forest, the history and the
//! listeners untouched.

use crate::{EditorError, Mutation, MutationError, SchemaDocument, UndoStack, WorkbenchState};
use crate::mutations::DropPosition;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};
use workbench_model::{
    Forest, IdGenerator, NodeId, NodePatch, PersistedNode, SchemaNode, Variable, VariableLibrary,
};

/// Handle returned by [`EditSession::subscribe`]
pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&Forest)>;

/// Single-user edit session over one document
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    document: SchemaDocument,

    state: WorkbenchState,

    /// Node under the pointer, if any
    hovered: Option<NodeId>,

    history: UndoStack,

    ids: IdGenerator,

    listeners: Vec<(ListenerId, Listener)>,

    next_listener: ListenerId,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("document", &self.document)
            .field("state", &self.state)
            .field("hovered", &self.hovered)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditSession {
    /// Create new edit session. The id generator resumes after any ids
    /// already present in the document.
    pub fn new(id: impl Into<String>, document: SchemaDocument, mut ids: IdGenerator) -> Self {
        ids.resume_after(document.forest().walk().map(|entry| &entry.node.id));

        Self {
            id: id.into(),
            document,
            state: WorkbenchState::default(),
            hovered: None,
            history: UndoStack::new(),
            ids,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn forest(&self) -> &Forest {
        self.document.forest()
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SchemaDocument {
        &mut self.document
    }

    pub fn state(&self) -> WorkbenchState {
        self.state
    }

    pub fn set_state(&mut self, state: WorkbenchState) {
        if self.state != state {
            info!(session = %self.id, from = %self.state, to = %state, "Workbench state changed");
            self.state = state;
        }
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Track the node under the pointer. Unknown ids clear the hover.
    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        self.hovered = id.filter(|id| self.forest().contains(id));
    }

    /// Register a listener called with every new forest
    pub fn subscribe(&mut self, listener: impl FnMut(&Forest) + 'static) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, next: Forest) -> bool {
        if !self.document.replace(next) {
            return false;
        }
        if let Some(hovered) = &self.hovered {
            if !self.document.forest().contains(hovered) {
                self.hovered = None;
            }
        }

        let forest = self.document.forest().clone();
        for (_, listener) in &mut self.listeners {
            listener(&forest);
        }
        true
    }

    /// Apply a command, returning whether the forest changed
    pub fn try_dispatch(&mut self, mutation: Mutation) -> Result<bool, MutationError> {
        if !self.state.permits(&mutation) {
            return Err(MutationError::Forbidden(self.state));
        }

        let current = self.document.forest().clone();
        let next = self.history.apply(&mutation, &current)?;
        Ok(self.publish(next))
    }

    /// Apply a command; rejections are logged and ignored
    pub fn dispatch(&mut self, mutation: Mutation) -> bool {
        let label = mutation.label();
        match self.try_dispatch(mutation) {
            Ok(changed) => changed,
            Err(error) => {
                debug!(session = %self.id, mutation = label, %error, "Mutation rejected");
                false
            }
        }
    }

    pub fn add_node(&mut self, node: SchemaNode, parent: Option<&NodeId>) -> bool {
        self.dispatch(Mutation::AddNode {
            node,
            parent: parent.cloned(),
        })
    }

    /// Create a node for a library variable with a fresh id
    pub fn add_variable(&mut self, variable: &Variable, parent: Option<&NodeId>) -> Option<NodeId> {
        let id = self.ids.new_id();
        let node = SchemaNode::from_variable(id.clone(), variable);
        self.add_node(node, parent).then_some(id)
    }

    /// Create an empty section with a fresh id
    pub fn add_section(&mut self, name: Option<&str>, parent: Option<&NodeId>) -> Option<NodeId> {
        let id = self.ids.new_id();
        let node = SchemaNode::section(id.clone(), name);
        self.add_node(node, parent).then_some(id)
    }

    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        self.dispatch(Mutation::RemoveNode {
            node_id: id.clone(),
        })
    }

    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) -> bool {
        self.dispatch(Mutation::UpdateNode {
            node_id: id.clone(),
            patch,
        })
    }

    pub fn toggle_expand(&mut self, id: &NodeId) -> bool {
        self.dispatch(Mutation::ToggleExpand {
            node_id: id.clone(),
        })
    }

    pub fn move_node(&mut self, dragged: &NodeId, target: &NodeId, position: DropPosition) -> bool {
        self.dispatch(Mutation::MoveNode {
            dragged_id: dragged.clone(),
            target_id: target.clone(),
            position,
        })
    }

    pub fn change_parent(&mut self, id: &NodeId, new_parent: Option<&NodeId>) -> bool {
        self.dispatch(Mutation::ChangeParent {
            node_id: id.clone(),
            new_parent: new_parent.cloned(),
        })
    }

    pub fn move_up(&mut self, id: &NodeId) -> bool {
        self.dispatch(Mutation::MoveUp {
            node_id: id.clone(),
        })
    }

    pub fn move_down(&mut self, id: &NodeId) -> bool {
        self.dispatch(Mutation::MoveDown {
            node_id: id.clone(),
        })
    }

    pub fn apply_bulk_patch(&mut self, patches: HashMap<NodeId, NodePatch>) -> bool {
        self.dispatch(Mutation::ApplyBulkPatch { patches })
    }

    /// Replace the forest with persisted blocks, re-linking icon handles.
    ///
    /// Loading starts a fresh history.
    pub fn load(
        &mut self,
        persisted: Vec<PersistedNode>,
        library: &VariableLibrary,
    ) -> Result<bool, EditorError> {
        let forest = Forest::from_persisted(persisted)?.rehydrate(library);
        self.ids.resume_after(forest.walk().map(|entry| &entry.node.id));
        self.history.clear();

        info!(session = %self.id, nodes = forest.len(), "Loaded schema into session");
        Ok(self.publish(forest))
    }

    /// Remove every block. Undoable; refused while structure is locked.
    pub fn clear(&mut self) -> bool {
        if self.state.locks_structure() || self.forest().is_empty() {
            return false;
        }

        let before = self.document.forest().clone();
        let empty = Forest::new();
        self.history
            .record_snapshot(before, empty.clone(), "Clear schema");
        self.publish(empty)
    }

    pub fn begin_batch(&mut self, description: &str) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Whether restoring `target` is allowed in the current state.
    ///
    /// Locked states only accept history steps that keep every root and
    /// child list as it is.
    fn may_restore(&self, target: Option<&Forest>) -> bool {
        let Some(target) = target else {
            return false;
        };
        if self.state.is_read_only() {
            return false;
        }
        if self.state.locks_structure() && !target.same_shape(self.document.forest()) {
            debug!(session = %self.id, state = %self.state, "History step would change structure");
            return false;
        }
        true
    }

    /// Undo the last step. Archived sessions keep their history frozen.
    pub fn undo(&mut self) -> bool {
        if !self.may_restore(self.history.peek_undo()) {
            return false;
        }
        match self.history.undo() {
            Some(previous) => self.publish(previous),
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if !self.may_restore(self.history.peek_redo()) {
            return false;
        }
        match self.history.redo() {
            Some(next) => self.publish(next),
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }
}
