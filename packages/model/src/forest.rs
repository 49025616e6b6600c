//! # Forest
//!
//! The ordered collection of root schema nodes plus everything reachable
//! through their children.
//!
//! ## Representation
//!
//! ```text
//! roots:   [a, d]                 ordered root ids
//! nodes:   {a: Arc<Node>, ...}    arena keyed by id
//! parents: {b: a, c: a}           reverse index derived from containment
//! ```
//!
//! All three tables sit behind `Arc`, so cloning a forest is O(1) and an
//! edit copies only the tables it touches. Untouched nodes keep their
//! `Arc`, which lets consumers detect change with pointer comparisons.
//!
//! A `Forest` is never mutated in place. [`Forest::edit`] opens a
//! [`ForestEdit`] on a copy; [`ForestEdit::finish`] yields the new value
//! and the source forest stays valid.

use crate::error::ForestError;
use crate::id::NodeId;
use crate::node::SchemaNode;
use crate::patch::NodePatch;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Forest {
    roots: Arc<Vec<NodeId>>,
    nodes: Arc<HashMap<NodeId, Arc<SchemaNode>>>,
    parents: Arc<HashMap<NodeId, NodeId>>,
}

impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        // The parent index is derived from containment
        self.roots == other.roots && self.nodes == other.nodes
    }
}

/// Location of a node among its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub total: usize,
    pub parent: Option<NodeId>,
}

/// One step of a depth-first walk
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'f> {
    pub node: &'f SchemaNode,
    pub parent: Option<&'f SchemaNode>,
    pub depth: usize,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered root ids
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: &NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    /// Shared handle to a node, for pointer-equality checks
    pub fn node(&self, id: &NodeId) -> Option<&Arc<SchemaNode>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordered children of `id` (empty for leaves and unknown ids)
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.get(id).map(SchemaNode::children).unwrap_or(&[])
    }

    /// Owning section of `id`, or `None` for roots and unknown ids
    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// The list that contains `id`: its parent's children, or the roots
    pub fn siblings(&self, id: &NodeId) -> Option<&[NodeId]> {
        if !self.contains(id) {
            return None;
        }
        match self.parent(id) {
            Some(parent) => Some(self.children(parent)),
            None => Some(&self.roots),
        }
    }

    /// Index of `id` within its sibling list
    pub fn position(&self, id: &NodeId) -> Option<Position> {
        let siblings = self.siblings(id)?;
        let index = siblings.iter().position(|sibling| sibling == id)?;
        Some(Position {
            index,
            total: siblings.len(),
            parent: self.parent(id).cloned(),
        })
    }

    /// Full descendant closure of `id`, excluding `id` itself
    pub fn descendants(&self, id: &NodeId) -> HashSet<NodeId> {
        let mut closure = HashSet::new();
        let mut stack: Vec<&NodeId> = self.children(id).iter().collect();

        while let Some(current) = stack.pop() {
            if closure.insert(current.clone()) {
                stack.extend(self.children(current));
            }
        }

        closure
    }

    /// Whether `node` lies somewhere beneath `candidate_ancestor`
    pub fn is_descendant_of(&self, candidate_ancestor: &NodeId, node: &NodeId) -> bool {
        self.descendants(candidate_ancestor).contains(node)
    }

    /// Pre-order depth-first walk over the whole forest
    pub fn walk(&self) -> Walk<'_> {
        let stack = self
            .roots
            .iter()
            .rev()
            .map(|id| (id, None, 0))
            .collect();
        Walk {
            forest: self,
            stack,
        }
    }

    /// Every node in pre-order
    pub fn flatten(&self) -> Vec<&SchemaNode> {
        self.walk().map(|entry| entry.node).collect()
    }

    /// Every section node in pre-order
    pub fn sections(&self) -> Vec<&SchemaNode> {
        self.walk()
            .map(|entry| entry.node)
            .filter(|node| node.is_section())
            .collect()
    }

    /// Every non-section node in pre-order
    pub fn fields(&self) -> Vec<&SchemaNode> {
        self.walk()
            .map(|entry| entry.node)
            .filter(|node| !node.is_section())
            .collect()
    }

    /// True when both values share every table, i.e. nothing changed
    pub fn ptr_eq(&self, other: &Forest) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
            && Arc::ptr_eq(&self.nodes, &other.nodes)
            && Arc::ptr_eq(&self.parents, &other.parents)
    }

    /// Same roots and the same child list for every node.
    ///
    /// Attributes may differ; only containment and order are compared.
    pub fn same_shape(&self, other: &Forest) -> bool {
        if self.roots != other.roots || self.nodes.len() != other.nodes.len() {
            return false;
        }
        self.nodes.iter().all(|(id, node)| {
            other
                .nodes
                .get(id)
                .is_some_and(|theirs| theirs.children == node.children)
        })
    }

    /// Open a copy-on-write edit of this forest
    pub fn edit(&self) -> ForestEdit {
        ForestEdit {
            roots: Arc::clone(&self.roots),
            nodes: Arc::clone(&self.nodes),
            parents: Arc::clone(&self.parents),
        }
    }

    /// Verify the structural invariants.
    ///
    /// Ids are unique along containment, only sections own children, the
    /// parent index matches containment exactly and every stored node is
    /// reachable from a root.
    pub fn check_integrity(&self) -> Result<(), ForestError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<(&NodeId, Option<&NodeId>)> =
            self.roots.iter().map(|id| (id, None)).collect();

        while let Some((id, parent)) = stack.pop() {
            if !seen.insert(id) {
                return Err(ForestError::DuplicateId(id.clone()));
            }
            let node = self
                .get(id)
                .ok_or_else(|| ForestError::NodeNotFound(id.clone()))?;
            if self.parents.get(id) != parent {
                return Err(ForestError::ParentMismatch(id.clone()));
            }
            if !node.is_section() && !node.children.is_empty() {
                return Err(ForestError::NotASection(id.clone()));
            }
            stack.extend(node.children.iter().map(|child| (child, Some(id))));
        }

        if let Some(orphan) = self.nodes.keys().find(|id| !seen.contains(id)) {
            return Err(ForestError::Orphaned(orphan.clone()));
        }
        if let Some(stale) = self.parents.keys().find(|id| !seen.contains(id)) {
            return Err(ForestError::ParentMismatch(stale.clone()));
        }

        Ok(())
    }
}

/// Pre-order iterator returned by [`Forest::walk`]
pub struct Walk<'f> {
    forest: &'f Forest,
    stack: Vec<(&'f NodeId, Option<&'f SchemaNode>, usize)>,
}

impl<'f> Iterator for Walk<'f> {
    type Item = WalkEntry<'f>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, parent, depth) = self.stack.pop()?;
            let Some(node) = self.forest.get(id) else {
                continue;
            };
            for child in node.children.iter().rev() {
                self.stack.push((child, Some(node), depth + 1));
            }
            return Some(WalkEntry {
                node,
                parent,
                depth,
            });
        }
    }
}

/// Where a detached node used to live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub parent: Option<NodeId>,
    pub index: usize,
}

/// Copy-on-write editing handle over a forest.
///
/// Primitives keep ids unique, children on sections only and the parent
/// index in step with containment. A node detached during an edit must be
/// re-attached or removed before [`finish`](ForestEdit::finish).
#[derive(Debug)]
pub struct ForestEdit {
    roots: Arc<Vec<NodeId>>,
    nodes: Arc<HashMap<NodeId, Arc<SchemaNode>>>,
    parents: Arc<HashMap<NodeId, NodeId>>,
}

impl ForestEdit {
    pub fn get(&self, id: &NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// Current list and index of an attached node
    pub fn placement(&self, id: &NodeId) -> Option<Placement> {
        let parent = self.parents.get(id).cloned();
        let list: &[NodeId] = match &parent {
            Some(parent_id) => self.get(parent_id)?.children(),
            None => &self.roots,
        };
        let index = list.iter().position(|entry| entry == id)?;
        Some(Placement { parent, index })
    }

    fn is_attached(&self, id: &NodeId) -> bool {
        self.parents.contains_key(id) || self.roots.contains(id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut SchemaNode> {
        Arc::make_mut(&mut self.nodes).get_mut(id).map(Arc::make_mut)
    }

    /// Store a new, detached node. Any children it carries are dropped.
    pub fn insert(&mut self, mut node: SchemaNode) -> Result<(), ForestError> {
        if self.nodes.contains_key(&node.id) {
            return Err(ForestError::DuplicateId(node.id));
        }
        node.children.clear();
        Arc::make_mut(&mut self.nodes).insert(node.id.clone(), Arc::new(node));
        Ok(())
    }

    /// Place a detached node under `parent` (or among the roots) at
    /// `index`, appending when `index` is `None` or past the end.
    pub fn attach(
        &mut self,
        id: &NodeId,
        parent: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<(), ForestError> {
        if !self.nodes.contains_key(id) {
            return Err(ForestError::NodeNotFound(id.clone()));
        }
        if self.is_attached(id) {
            return Err(ForestError::StillAttached(id.clone()));
        }

        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .get(parent_id)
                    .ok_or_else(|| ForestError::NodeNotFound(parent_id.clone()))?;
                if !parent_node.is_section() {
                    return Err(ForestError::NotASection(parent_id.clone()));
                }
                // `id` is detached, so its subtree's parent chains end at `id`
                let mut cursor = Some(parent_id);
                while let Some(current) = cursor {
                    if current == id {
                        return Err(ForestError::WouldCreateCycle { node: id.clone() });
                    }
                    cursor = self.parents.get(current);
                }

                let parent_id = parent_id.clone();
                if let Some(parent_node) = self.node_mut(&parent_id) {
                    let at = index
                        .unwrap_or(parent_node.children.len())
                        .min(parent_node.children.len());
                    parent_node.children.insert(at, id.clone());
                }
                Arc::make_mut(&mut self.parents).insert(id.clone(), parent_id);
            }
            None => {
                let roots = Arc::make_mut(&mut self.roots);
                let at = index.unwrap_or(roots.len()).min(roots.len());
                roots.insert(at, id.clone());
            }
        }

        Ok(())
    }

    /// Unlink a node (with its subtree intact) from its current list
    pub fn detach(&mut self, id: &NodeId) -> Result<Placement, ForestError> {
        if !self.nodes.contains_key(id) {
            return Err(ForestError::NodeNotFound(id.clone()));
        }

        match self.parents.get(id).cloned() {
            Some(parent_id) => {
                let parent_node = self
                    .node_mut(&parent_id)
                    .ok_or_else(|| ForestError::NodeNotFound(parent_id.clone()))?;
                let index = parent_node
                    .children
                    .iter()
                    .position(|child| child == id)
                    .ok_or_else(|| ForestError::ParentMismatch(id.clone()))?;
                parent_node.children.remove(index);
                Arc::make_mut(&mut self.parents).remove(id);
                Ok(Placement {
                    parent: Some(parent_id),
                    index,
                })
            }
            None => {
                let index = self
                    .roots
                    .iter()
                    .position(|root| root == id)
                    .ok_or_else(|| ForestError::Orphaned(id.clone()))?;
                Arc::make_mut(&mut self.roots).remove(index);
                Ok(Placement {
                    parent: None,
                    index,
                })
            }
        }
    }

    /// Delete a node and its entire subtree, returning the removed ids in pre-order
    pub fn remove(&mut self, id: &NodeId) -> Result<Vec<NodeId>, ForestError> {
        self.detach(id)?;

        let mut removed = Vec::new();
        let mut stack = vec![id.clone()];
        let nodes = Arc::make_mut(&mut self.nodes);
        let parents = Arc::make_mut(&mut self.parents);

        while let Some(current) = stack.pop() {
            if let Some(node) = nodes.remove(&current) {
                stack.extend(node.children.iter().rev().cloned());
            }
            parents.remove(&current);
            removed.push(current);
        }

        Ok(removed)
    }

    /// Rewrite a node's attributes. The id and children cannot change.
    pub fn update(
        &mut self,
        id: &NodeId,
        f: impl FnOnce(&mut SchemaNode),
    ) -> Result<(), ForestError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| ForestError::NodeNotFound(id.clone()))?;
        let original_id = node.id.clone();
        let original_type = node.data_type;
        let children = std::mem::take(&mut node.children);

        f(node);

        node.id = original_id;
        if !children.is_empty() && !node.is_section() {
            node.data_type = original_type;
        }
        node.children = children;
        Ok(())
    }

    /// Shallow-merge a patch onto a node
    pub fn patch(&mut self, id: &NodeId, patch: &NodePatch) -> Result<(), ForestError> {
        let node = self
            .get(id)
            .ok_or_else(|| ForestError::NodeNotFound(id.clone()))?;
        let patched = patch.apply_to(node);
        self.update(id, move |node| *node = patched)
    }

    /// Swap two entries of the same sibling list
    pub fn swap_siblings(&mut self, a: &NodeId, b: &NodeId) -> Result<(), ForestError> {
        let parent = self.parents.get(a).cloned();
        if self.parents.get(b) != parent.as_ref() {
            return Err(ForestError::ParentMismatch(b.clone()));
        }

        let list = match &parent {
            Some(parent_id) => {
                &mut self
                    .node_mut(parent_id)
                    .ok_or_else(|| ForestError::NodeNotFound(parent_id.clone()))?
                    .children
            }
            None => Arc::make_mut(&mut self.roots),
        };
        let i = list
            .iter()
            .position(|id| id == a)
            .ok_or_else(|| ForestError::NodeNotFound(a.clone()))?;
        let j = list
            .iter()
            .position(|id| id == b)
            .ok_or_else(|| ForestError::NodeNotFound(b.clone()))?;
        list.swap(i, j);
        Ok(())
    }

    pub fn finish(self) -> Forest {
        Forest {
            roots: self.roots,
            nodes: self.nodes,
            parents: self.parents,
        }
    }
}
