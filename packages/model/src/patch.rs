use crate::id::NodeId;
use crate::node::{AnalysisMethod, Category, DataType, EndpointTier, RoleTag, SchemaNode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Partial attribute update for a schema node.
///
/// `None` leaves a field untouched. Nullable attributes use a nested
/// option: `Some(None)` clears the value (`null` on the wire). The id and
/// the children list are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleTag>,

    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub endpoint_tier: Option<Option<EndpointTier>>,

    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub analysis_method: Option<Option<AnalysisMethod>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<Option<String>>,

    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub unit: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,

    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<NodeId>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_items: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_categories: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_rows: Option<Vec<String>>,
}

// A present field (even `null`) becomes `Some(..)`; an absent one stays `None` via `default`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: RoleTag) -> Self {
        self.role = Some(role);
        self
    }

    pub fn endpoint_tier(mut self, tier: Option<EndpointTier>) -> Self {
        self.endpoint_tier = Some(tier);
        self
    }

    pub fn analysis_method(mut self, method: Option<AnalysisMethod>) -> Self {
        self.analysis_method = Some(method);
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(Some(name.into()));
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge this patch onto `node`, producing the updated node.
    ///
    /// A kind change that would leave a section's children under a leaf
    /// kind is dropped; every other field is applied as given.
    pub fn apply_to(&self, node: &SchemaNode) -> SchemaNode {
        let mut next = node.clone();

        if let Some(data_type) = self.data_type {
            if node.is_section() && !data_type.is_section() && !node.children.is_empty() {
                debug!(
                    node_id = %node.id,
                    requested = %data_type,
                    "Ignoring kind change on a section that owns children"
                );
            } else {
                next.data_type = data_type;
            }
        }
        if let Some(role) = self.role {
            next.role = role;
        }
        if let Some(tier) = self.endpoint_tier {
            next.endpoint_tier = tier;
        }
        if let Some(method) = self.analysis_method {
            next.analysis_method = method;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(name) = &self.custom_name {
            next.custom_name = name.clone();
        }
        if let Some(unit) = &self.unit {
            next.unit = unit.clone();
        }
        if let Some(expanded) = self.is_expanded {
            next.is_expanded = expanded;
        }
        if let Some(tag) = &self.version_tag {
            next.version_tag = tag.clone();
        }
        if let Some(dependencies) = &self.dependencies {
            next.dependencies = dependencies.clone();
        }
        if let Some(options) = &self.options {
            next.options = options.clone();
        }
        if let Some(items) = &self.grid_items {
            next.grid_items = items.clone();
        }
        if let Some(categories) = &self.grid_categories {
            next.grid_categories = categories.clone();
        }
        if let Some(rows) = &self.matrix_rows {
            next.matrix_rows = rows.clone();
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_merge_leaves_other_fields() {
        let node = SchemaNode::field("f1", "Stroke Severity", DataType::Continuous)
            .with_endpoint_tier(EndpointTier::Secondary);

        let patched = NodePatch::new().role(RoleTag::Outcome).apply_to(&node);

        assert_eq!(patched.role, RoleTag::Outcome);
        assert_eq!(patched.endpoint_tier, Some(EndpointTier::Secondary));
        assert_eq!(patched.display_name(), "Stroke Severity");
        assert_eq!(patched.id, node.id);
    }

    #[test]
    fn test_null_clears_nullable_field() {
        let node = SchemaNode::field("f1", "PFS", DataType::Continuous)
            .with_endpoint_tier(EndpointTier::Primary);

        let patch: NodePatch = serde_json::from_str(r#"{"endpointTier": null}"#).unwrap();
        assert_eq!(patch.endpoint_tier, Some(None));

        let patched = patch.apply_to(&node);
        assert_eq!(patched.endpoint_tier, None);
    }

    #[test]
    fn test_absent_field_is_untouched() {
        let patch: NodePatch = serde_json::from_str(r#"{"role": "Predictor"}"#).unwrap();
        assert_eq!(patch.endpoint_tier, None);
        assert_eq!(patch.role, Some(RoleTag::Predictor));

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "Predictor" }));
    }

    #[test]
    fn test_section_with_children_keeps_kind() {
        let mut section = SchemaNode::section("s1", Some("Baseline"));
        section.children.push(NodeId::new("f1"));

        let patched = NodePatch::new().data_type(DataType::Text).apply_to(&section);
        assert_eq!(patched.data_type, DataType::Section);

        let empty = SchemaNode::section("s2", None);
        let patched = NodePatch::new().data_type(DataType::Text).apply_to(&empty);
        assert_eq!(patched.data_type, DataType::Text);
    }

    #[test]
    fn test_empty_patch() {
        assert!(NodePatch::new().is_empty());
        assert!(!NodePatch::new().role(RoleTag::Outcome).is_empty());
    }
}
