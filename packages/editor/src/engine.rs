//! # Tree Mutation Engine
//!
//! Pure operations over a [`Forest`]. Each returns a new forest value and
//! never touches its input.
//!
//! Every operation comes in two forms:
//!
//! - `try_*` returns the typed [`MutationError`] on invalid input
//! - the plain form logs the rejection and returns the input unchanged
//!   (a clone sharing every table, so [`Forest::ptr_eq`] holds)
//!
//! ## Move Semantics
//!
//! ```text
//! locate dragged ─→ locate target ─→ inside? target must be Section
//!        ─→ cycle guard (target ∈ descendants(dragged) → reject)
//!        ─→ detach dragged subtree ─→ re-home before/after/inside
//! ```
//!
//! Only the moved node's parent link changes; the subtree travels intact.

use crate::mutations::{DropPosition, MutationError};
use std::collections::HashMap;
use tracing::debug;
use workbench_model::{Forest, NodeId, NodePatch, SchemaNode};

fn or_unchanged(forest: &Forest, operation: &str, result: Result<Forest, MutationError>) -> Forest {
    match result {
        Ok(next) => next,
        Err(error) => {
            debug!(operation, %error, "Rejected mutation, forest unchanged");
            forest.clone()
        }
    }
}

fn require(forest: &Forest, id: &NodeId) -> Result<(), MutationError> {
    if forest.contains(id) {
        Ok(())
    } else {
        Err(MutationError::NodeNotFound(id.clone()))
    }
}

fn require_section(forest: &Forest, id: &NodeId) -> Result<(), MutationError> {
    let node = forest
        .get(id)
        .ok_or_else(|| MutationError::TargetNotFound(id.clone()))?;
    if node.is_section() {
        Ok(())
    } else {
        Err(MutationError::NotASection(id.clone()))
    }
}

/// Reject placing `node` at or beneath itself
fn guard_cycle(forest: &Forest, node: &NodeId, target: &NodeId) -> Result<(), MutationError> {
    if node == target || forest.is_descendant_of(node, target) {
        return Err(MutationError::CycleDetected(node.clone()));
    }
    Ok(())
}

/// Append `node` as the last child of `parent`, or as the last root
pub fn try_add_node(
    forest: &Forest,
    node: SchemaNode,
    parent: Option<&NodeId>,
) -> Result<Forest, MutationError> {
    if forest.contains(&node.id) {
        return Err(MutationError::DuplicateId(node.id));
    }
    if let Some(parent_id) = parent {
        require_section(forest, parent_id)?;
    }

    let id = node.id.clone();
    let mut edit = forest.edit();
    edit.insert(node)?;
    edit.attach(&id, parent, None)?;
    Ok(edit.finish())
}

pub fn add_node(forest: &Forest, node: SchemaNode, parent: Option<&NodeId>) -> Forest {
    or_unchanged(forest, "add_node", try_add_node(forest, node, parent))
}

/// Remove a node together with its whole subtree
pub fn try_remove_node(forest: &Forest, id: &NodeId) -> Result<Forest, MutationError> {
    require(forest, id)?;

    let mut edit = forest.edit();
    let removed = edit.remove(id)?;
    debug!(node_id = %id, removed = removed.len(), "Removed subtree");
    Ok(edit.finish())
}

pub fn remove_node(forest: &Forest, id: &NodeId) -> Forest {
    or_unchanged(forest, "remove_node", try_remove_node(forest, id))
}

/// Shallow-merge a patch onto one node. Every other node keeps its `Arc`.
pub fn try_update_node(
    forest: &Forest,
    id: &NodeId,
    patch: &NodePatch,
) -> Result<Forest, MutationError> {
    let node = forest
        .get(id)
        .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
    if patch.apply_to(node) == *node {
        return Ok(forest.clone());
    }

    let mut edit = forest.edit();
    edit.patch(id, patch)?;
    Ok(edit.finish())
}

pub fn update_node(forest: &Forest, id: &NodeId, patch: &NodePatch) -> Forest {
    or_unchanged(forest, "update_node", try_update_node(forest, id, patch))
}

/// Flip the expanded flag on a node of any kind
pub fn try_toggle_expand(forest: &Forest, id: &NodeId) -> Result<Forest, MutationError> {
    require(forest, id)?;

    let mut edit = forest.edit();
    edit.update(id, |node| node.is_expanded = !node.is_expanded)?;
    Ok(edit.finish())
}

pub fn toggle_expand(forest: &Forest, id: &NodeId) -> Forest {
    or_unchanged(forest, "toggle_expand", try_toggle_expand(forest, id))
}

/// Drag-and-drop relocation of `dragged` relative to `target`
pub fn try_move_node(
    forest: &Forest,
    dragged: &NodeId,
    target: &NodeId,
    position: DropPosition,
) -> Result<Forest, MutationError> {
    require(forest, dragged)?;
    if !forest.contains(target) {
        return Err(MutationError::TargetNotFound(target.clone()));
    }
    if position == DropPosition::Inside {
        require_section(forest, target)?;
    }
    guard_cycle(forest, dragged, target)?;

    let mut edit = forest.edit();
    edit.detach(dragged)?;

    match position {
        DropPosition::Inside => edit.attach(dragged, Some(target), None)?,
        DropPosition::Before | DropPosition::After => {
            // Re-read the target's slot: detaching may have shifted it
            let slot = edit
                .placement(target)
                .ok_or_else(|| MutationError::TargetNotFound(target.clone()))?;
            let index = match position {
                DropPosition::Before => slot.index,
                _ => slot.index + 1,
            };
            edit.attach(dragged, slot.parent.as_ref(), Some(index))?;
        }
    }

    Ok(edit.finish())
}

pub fn move_node(
    forest: &Forest,
    dragged: &NodeId,
    target: &NodeId,
    position: DropPosition,
) -> Forest {
    or_unchanged(
        forest,
        "move_node",
        try_move_node(forest, dragged, target, position),
    )
}

/// Re-home a node as the last child of `new_parent`, or as the last root.
///
/// Always appends, even when the parent does not change.
pub fn try_change_parent(
    forest: &Forest,
    id: &NodeId,
    new_parent: Option<&NodeId>,
) -> Result<Forest, MutationError> {
    require(forest, id)?;
    if let Some(parent_id) = new_parent {
        require_section(forest, parent_id)?;
        guard_cycle(forest, id, parent_id)?;
    }

    let mut edit = forest.edit();
    edit.detach(id)?;
    edit.attach(id, new_parent, None)?;
    Ok(edit.finish())
}

pub fn change_parent(forest: &Forest, id: &NodeId, new_parent: Option<&NodeId>) -> Forest {
    or_unchanged(
        forest,
        "change_parent",
        try_change_parent(forest, id, new_parent),
    )
}

/// Patch many nodes in one pass. Ids missing from the forest are ignored.
pub fn apply_bulk_patch(forest: &Forest, patches: &HashMap<NodeId, NodePatch>) -> Forest {
    let mut edit = forest.edit();
    let mut applied = 0usize;

    for (id, patch) in patches {
        let Some(node) = forest.get(id) else {
            debug!(node_id = %id, "Bulk patch entry has no matching node");
            continue;
        };
        if patch.apply_to(node) == *node {
            continue;
        }
        if edit.patch(id, patch).is_ok() {
            applied += 1;
        }
    }

    if applied == 0 {
        return forest.clone();
    }
    debug!(applied, requested = patches.len(), "Applied bulk patch");
    edit.finish()
}

fn try_swap_with(forest: &Forest, id: &NodeId, offset: isize) -> Result<Forest, MutationError> {
    let position = forest
        .position(id)
        .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
    let Some(neighbour_index) = position.index.checked_add_signed(offset) else {
        return Ok(forest.clone());
    };
    let Some(neighbour) = forest
        .siblings(id)
        .and_then(|siblings| siblings.get(neighbour_index))
    else {
        return Ok(forest.clone());
    };

    let mut edit = forest.edit();
    edit.swap_siblings(id, neighbour)?;
    Ok(edit.finish())
}

/// Swap a node with its previous sibling; no-op at the top of its list
pub fn try_move_up(forest: &Forest, id: &NodeId) -> Result<Forest, MutationError> {
    try_swap_with(forest, id, -1)
}

pub fn move_up(forest: &Forest, id: &NodeId) -> Forest {
    or_unchanged(forest, "move_up", try_move_up(forest, id))
}

/// Swap a node with its next sibling; no-op at the bottom of its list
pub fn try_move_down(forest: &Forest, id: &NodeId) -> Result<Forest, MutationError> {
    try_swap_with(forest, id, 1)
}

pub fn move_down(forest: &Forest, id: &NodeId) -> Forest {
    or_unchanged(forest, "move_down", try_move_down(forest, id))
}
