//! Persisted (wire) form of a forest.
//!
//! Nodes are stored as nested JSON objects: every node carries its
//! attributes, an optional `parentId` and, for sections, an embedded
//! `children` array. Icon handles are dropped on save and restored from
//! the variable library on load.

use crate::error::ForestError;
use crate::forest::Forest;
use crate::forest::ForestEdit;
use crate::id::NodeId;
use crate::library::VariableLibrary;
use crate::node::SchemaNode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNode {
    #[serde(flatten)]
    pub node: SchemaNode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PersistedNode>>,
}

impl Forest {
    /// Convert to the nested persisted form, roots in order
    pub fn to_persisted(&self) -> Vec<PersistedNode> {
        self.roots()
            .iter()
            .filter_map(|id| self.persist_node(id))
            .collect()
    }

    fn persist_node(&self, id: &NodeId) -> Option<PersistedNode> {
        let node = self.get(id)?;
        let children = node.is_section().then(|| {
            node.children()
                .iter()
                .filter_map(|child| self.persist_node(child))
                .collect()
        });

        let mut stored = node.clone();
        stored.children.clear();

        Some(PersistedNode {
            node: stored,
            parent_id: self.parent(id).cloned(),
            children,
        })
    }

    /// Rebuild a forest from persisted roots.
    ///
    /// Containment wins over stored `parentId` values; disagreements are
    /// logged and ignored.
    pub fn from_persisted(roots: Vec<PersistedNode>) -> Result<Forest, ForestError> {
        let mut edit = Forest::new().edit();
        for root in roots {
            restore_node(&mut edit, root, None)?;
        }
        let forest = edit.finish();
        debug!(nodes = forest.len(), "Restored persisted forest");
        Ok(forest)
    }

    /// Re-derive icon handles from the library by variable id.
    ///
    /// Nodes whose variable is unknown to the library keep their handle.
    pub fn rehydrate(&self, library: &VariableLibrary) -> Forest {
        let stale: Vec<(NodeId, crate::node::IconHandle)> = self
            .walk()
            .filter_map(|entry| {
                let icon = library.get(&entry.node.variable_id)?.icon.as_ref()?;
                (entry.node.icon.as_ref() != Some(icon))
                    .then(|| (entry.node.id.clone(), icon.clone()))
            })
            .collect();

        if stale.is_empty() {
            return self.clone();
        }

        let mut edit = self.edit();
        for (id, icon) in stale {
            if let Err(err) = edit.update(&id, |node| node.icon = Some(icon)) {
                debug!(node_id = %id, error = %err, "Icon refresh skipped");
            }
        }
        edit.finish()
    }
}

fn restore_node(
    edit: &mut ForestEdit,
    persisted: PersistedNode,
    parent: Option<&NodeId>,
) -> Result<(), ForestError> {
    let PersistedNode {
        node,
        parent_id,
        children,
    } = persisted;
    let id = node.id.clone();

    if parent_id.as_ref() != parent {
        warn!(
            node_id = %id,
            stored = ?parent_id,
            actual = ?parent,
            "Stored parentId disagrees with containment, using containment"
        );
    }

    let children = children.unwrap_or_default();
    if !node.is_section() && !children.is_empty() {
        return Err(ForestError::NotASection(id));
    }

    edit.insert(node)?;
    edit.attach(&id, parent, None)?;

    for child in children {
        restore_node(edit, child, Some(&id))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DataType, IconHandle};
    use serde_json::json;

    fn nested() -> serde_json::Value {
        json!([
            {
                "id": "s1",
                "variableId": "section",
                "variableName": "Section Container",
                "category": "Structural",
                "dataType": "Section",
                "role": "Structure",
                "customName": "Baseline",
                "isExpanded": true,
                "children": [
                    {
                        "id": "f1",
                        "variableId": "age",
                        "variableName": "Age",
                        "category": "Demographics",
                        "dataType": "Continuous",
                        "role": "Predictor",
                        "unit": "years",
                        "parentId": "s1"
                    }
                ]
            },
            {
                "id": "f2",
                "variableId": "os",
                "variableName": "Overall Survival (OS)",
                "category": "Endpoints",
                "dataType": "Continuous",
                "role": "Outcome",
                "endpointTier": "primary"
            }
        ])
    }

    #[test]
    fn test_load_nested_forest() {
        let roots: Vec<PersistedNode> = serde_json::from_value(nested()).unwrap();
        let forest = Forest::from_persisted(roots).unwrap();

        assert_eq!(forest.roots(), &[NodeId::new("s1"), NodeId::new("f2")]);
        assert_eq!(forest.children(&NodeId::new("s1")), &[NodeId::new("f1")]);
        assert_eq!(forest.parent(&NodeId::new("f1")), Some(&NodeId::new("s1")));
        assert!(forest.check_integrity().is_ok());
    }

    #[test]
    fn test_save_then_load_preserves_structure() {
        let roots: Vec<PersistedNode> = serde_json::from_value(nested()).unwrap();
        let forest = Forest::from_persisted(roots).unwrap();

        let saved = serde_json::to_value(forest.to_persisted()).unwrap();
        assert_eq!(saved[0]["children"][0]["parentId"], "s1");
        assert!(saved[1].get("children").is_none());
        assert!(saved[1].get("parentId").is_none());

        let reloaded: Vec<PersistedNode> = serde_json::from_value(saved).unwrap();
        assert_eq!(Forest::from_persisted(reloaded).unwrap(), forest);
    }

    #[test]
    fn test_containment_wins_over_parent_id() {
        let mut value = nested();
        value[0]["children"][0]["parentId"] = json!("elsewhere");
        let roots: Vec<PersistedNode> = serde_json::from_value(value).unwrap();

        let forest = Forest::from_persisted(roots).unwrap();
        assert_eq!(forest.parent(&NodeId::new("f1")), Some(&NodeId::new("s1")));
    }

    #[test]
    fn test_leaf_with_children_is_rejected() {
        let mut value = nested();
        value[1]["children"] = json!([{
            "id": "f3",
            "variableId": "custom",
            "variableName": "Note",
            "category": "Other",
            "dataType": "Text",
            "role": "Structure"
        }]);
        let roots: Vec<PersistedNode> = serde_json::from_value(value).unwrap();

        let err = Forest::from_persisted(roots).unwrap_err();
        assert_eq!(err, ForestError::NotASection(NodeId::new("f2")));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut value = nested();
        value[1]["id"] = json!("f1");
        let roots: Vec<PersistedNode> = serde_json::from_value(value).unwrap();

        let err = Forest::from_persisted(roots).unwrap_err();
        assert_eq!(err, ForestError::DuplicateId(NodeId::new("f1")));
    }

    #[test]
    fn test_rehydrate_restores_icons() {
        let roots: Vec<PersistedNode> = serde_json::from_value(nested()).unwrap();
        let forest = Forest::from_persisted(roots).unwrap();
        assert!(forest.get(&NodeId::new("f1")).unwrap().icon.is_none());

        let library = VariableLibrary::builtin();
        let hydrated = forest.rehydrate(&library);

        let age = hydrated.get(&NodeId::new("f1")).unwrap();
        assert_eq!(age.icon, Some(IconHandle::new("calendar")));
        assert_eq!(age.data_type, DataType::Continuous);

        // Second pass has nothing to do
        assert!(hydrated.rehydrate(&library).ptr_eq(&hydrated));
    }

    #[test]
    fn test_rehydrate_only_touches_icons() {
        let roots: Vec<PersistedNode> = serde_json::from_value(nested()).unwrap();
        let forest = Forest::from_persisted(roots).unwrap();

        let hydrated = forest.rehydrate(&VariableLibrary::builtin());

        assert!(hydrated.same_shape(&forest));
        assert!(hydrated.check_integrity().is_ok());
        assert!(forest.get(&NodeId::new("f1")).unwrap().icon.is_none());

        let mut before = forest.get(&NodeId::new("f1")).unwrap().clone();
        before.icon = Some(IconHandle::new("calendar"));
        assert_eq!(hydrated.get(&NodeId::new("f1")).unwrap(), &before);
        assert_eq!(
            hydrated.get(&NodeId::new("s1")).unwrap().custom_name.as_deref(),
            Some("Baseline")
        );
    }
}
