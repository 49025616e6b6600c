//! Error types for the forest model

use crate::id::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForestError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Node is not a section: {0}")]
    NotASection(NodeId),

    #[error("Node is still attached: {0}")]
    StillAttached(NodeId),

    #[error("Node {node} cannot be placed inside its own subtree")]
    WouldCreateCycle { node: NodeId },

    #[error("Parent index disagrees with containment for node: {0}")]
    ParentMismatch(NodeId),

    #[error("Node is not reachable from any root: {0}")]
    Orphaned(NodeId),
}
