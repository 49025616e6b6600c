//! # Schema Mutations
//!
//! Command objects for every tree operation. A `Mutation` carries the
//! intent; the engine in [`crate::engine`] defines what it means.
//!
//! ## Mutation Semantics
//!
//! ### MoveNode
//! - Relocates the node with its whole subtree
//! - `inside` appends to a Section target
//! - `before`/`after` insert next to the target in the target's list
//! - Fails if the target lies in the dragged subtree
//!
//! ### ChangeParent
//! - Always appends to the new parent (or the roots)
//!
//! ### RemoveNode
//! - Removes node and all descendants atomically
//!
//! ### ApplyBulkPatch
//! - One pass; ids without a node are ignored

use crate::engine;
use crate::workbench::WorkbenchState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use workbench_model::{Forest, ForestError, NodeId, NodePatch, SchemaNode};

/// Where a dragged node lands relative to its drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Append a node to a section or to the roots
    AddNode {
        node: SchemaNode,
        #[serde(default)]
        parent: Option<NodeId>,
    },

    /// Remove a node and its subtree
    RemoveNode { node_id: NodeId },

    /// Shallow-merge attributes onto a node
    UpdateNode { node_id: NodeId, patch: NodePatch },

    ToggleExpand { node_id: NodeId },

    /// Drag-and-drop relocation
    MoveNode {
        dragged_id: NodeId,
        target_id: NodeId,
        position: DropPosition,
    },

    /// Re-home a node at the end of another section (or the roots)
    ChangeParent {
        node_id: NodeId,
        #[serde(default)]
        new_parent: Option<NodeId>,
    },

    MoveUp { node_id: NodeId },

    MoveDown { node_id: NodeId },

    /// Patch many nodes at once (e.g. accepted suggestions)
    ApplyBulkPatch { patches: HashMap<NodeId, NodePatch> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Target not found: {0}")]
    TargetNotFound(NodeId),

    #[error("Node is not a section: {0}")]
    NotASection(NodeId),

    #[error("Would create cycle: {0} cannot be placed inside its own subtree")]
    CycleDetected(NodeId),

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Mutation not permitted in {0} state")]
    Forbidden(WorkbenchState),

    #[error("Invalid structure: {0}")]
    InvalidStructure(ForestError),
}

impl From<ForestError> for MutationError {
    fn from(err: ForestError) -> Self {
        match err {
            ForestError::NodeNotFound(id) => MutationError::NodeNotFound(id),
            ForestError::DuplicateId(id) => MutationError::DuplicateId(id),
            ForestError::NotASection(id) => MutationError::NotASection(id),
            ForestError::WouldCreateCycle { node } => MutationError::CycleDetected(node),
            other => MutationError::InvalidStructure(other),
        }
    }
}

impl Mutation {
    /// Apply with validation, returning the new forest
    pub fn try_apply(&self, forest: &Forest) -> Result<Forest, MutationError> {
        match self {
            Mutation::AddNode { node, parent } => {
                engine::try_add_node(forest, node.clone(), parent.as_ref())
            }

            Mutation::RemoveNode { node_id } => engine::try_remove_node(forest, node_id),

            Mutation::UpdateNode { node_id, patch } => {
                engine::try_update_node(forest, node_id, patch)
            }

            Mutation::ToggleExpand { node_id } => engine::try_toggle_expand(forest, node_id),

            Mutation::MoveNode {
                dragged_id,
                target_id,
                position,
            } => engine::try_move_node(forest, dragged_id, target_id, *position),

            Mutation::ChangeParent {
                node_id,
                new_parent,
            } => engine::try_change_parent(forest, node_id, new_parent.as_ref()),

            Mutation::MoveUp { node_id } => engine::try_move_up(forest, node_id),

            Mutation::MoveDown { node_id } => engine::try_move_down(forest, node_id),

            Mutation::ApplyBulkPatch { patches } => Ok(engine::apply_bulk_patch(forest, patches)),
        }
    }

    /// Apply, returning the input unchanged when the mutation is invalid
    pub fn apply(&self, forest: &Forest) -> Forest {
        match self {
            Mutation::AddNode { node, parent } => {
                engine::add_node(forest, node.clone(), parent.as_ref())
            }
            Mutation::RemoveNode { node_id } => engine::remove_node(forest, node_id),
            Mutation::UpdateNode { node_id, patch } => engine::update_node(forest, node_id, patch),
            Mutation::ToggleExpand { node_id } => engine::toggle_expand(forest, node_id),
            Mutation::MoveNode {
                dragged_id,
                target_id,
                position,
            } => engine::move_node(forest, dragged_id, target_id, *position),
            Mutation::ChangeParent {
                node_id,
                new_parent,
            } => engine::change_parent(forest, node_id, new_parent.as_ref()),
            Mutation::MoveUp { node_id } => engine::move_up(forest, node_id),
            Mutation::MoveDown { node_id } => engine::move_down(forest, node_id),
            Mutation::ApplyBulkPatch { patches } => engine::apply_bulk_patch(forest, patches),
        }
    }

    /// Validate without keeping the result
    pub fn validate(&self, forest: &Forest) -> Result<(), MutationError> {
        self.try_apply(forest).map(|_| ())
    }

    /// Whether this mutation changes sibling order or parentage
    pub fn is_reorder(&self) -> bool {
        matches!(
            self,
            Mutation::MoveNode { .. }
                | Mutation::ChangeParent { .. }
                | Mutation::MoveUp { .. }
                | Mutation::MoveDown { .. }
        )
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Mutation::RemoveNode { .. })
    }

    /// Short human-readable label, used for undo descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::AddNode { .. } => "Add block",
            Mutation::RemoveNode { .. } => "Remove block",
            Mutation::UpdateNode { .. } => "Update block",
            Mutation::ToggleExpand { .. } => "Toggle expand",
            Mutation::MoveNode { .. } => "Move block",
            Mutation::ChangeParent { .. } => "Change parent",
            Mutation::MoveUp { .. } => "Move up",
            Mutation::MoveDown { .. } => "Move down",
            Mutation::ApplyBulkPatch { .. } => "Apply suggestions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_model::DataType;

    #[test]
    fn test_mutation_wire_format() {
        let mutation = Mutation::MoveNode {
            dragged_id: NodeId::new("b"),
            target_id: NodeId::new("a"),
            position: DropPosition::Inside,
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "moveNode",
                "draggedId": "b",
                "targetId": "a",
                "position": "inside"
            })
        );

        let parsed: Mutation =
            serde_json::from_str(r#"{"type": "changeParent", "nodeId": "b"}"#).unwrap();
        assert_eq!(
            parsed,
            Mutation::ChangeParent {
                node_id: NodeId::new("b"),
                new_parent: None
            }
        );
    }

    #[test]
    fn test_validation_rejects_unknown_node() {
        let forest = Forest::new();
        let mutation = Mutation::RemoveNode {
            node_id: NodeId::new(""),
        };

        assert_eq!(
            mutation.validate(&forest),
            Err(MutationError::NodeNotFound(NodeId::new("")))
        );
        assert!(mutation.apply(&forest).ptr_eq(&forest));
    }

    #[test]
    fn test_try_apply_and_apply_agree() {
        let add = Mutation::AddNode {
            node: SchemaNode::section("s1", Some("Baseline")),
            parent: None,
        };
        let forest = add.apply(&Forest::new());
        assert_eq!(add.try_apply(&Forest::new()).unwrap(), forest);

        let nested = Mutation::AddNode {
            node: SchemaNode::field("f1", "Age", DataType::Continuous),
            parent: Some(NodeId::new("s1")),
        };
        let forest = nested.try_apply(&forest).unwrap();
        assert_eq!(forest.parent(&NodeId::new("f1")), Some(&NodeId::new("s1")));
    }

    #[test]
    fn test_forest_errors_map_to_taxonomy() {
        let err: MutationError = ForestError::WouldCreateCycle {
            node: NodeId::new("a"),
        }
        .into();
        assert_eq!(err, MutationError::CycleDetected(NodeId::new("a")));

        let err: MutationError = ForestError::Orphaned(NodeId::new("a")).into();
        assert!(matches!(err, MutationError::InvalidStructure(_)));
    }

    #[test]
    fn test_reorder_classification() {
        let id = NodeId::new("a");
        assert!(Mutation::MoveUp { node_id: id.clone() }.is_reorder());
        assert!(!Mutation::ToggleExpand { node_id: id.clone() }.is_reorder());
        assert!(Mutation::RemoveNode { node_id: id }.is_removal());
    }
}
