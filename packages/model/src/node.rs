//! # Schema Nodes
//!
//! A schema node ("block") is one field or one section of a protocol
//! schema. Only [`DataType::Section`] nodes own children; the ordered
//! child list lives on the node, while the parent link is derived by the
//! owning [`Forest`](crate::Forest).

use crate::id::NodeId;
use crate::library::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used by sections without an explicit override
pub const UNTITLED_SECTION: &str = "Untitled Section";

/// Version tag given to freshly created nodes
pub const DEFAULT_VERSION_TAG: &str = "v1.0";

/// Kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Continuous,
    Categorical,
    Boolean,
    Date,
    Text,
    #[serde(rename = "Multi-Select")]
    MultiSelect,
    Grid,
    #[serde(rename = "Ranked-Matrix")]
    RankedMatrix,
    #[serde(rename = "Categorical-Grid")]
    CategoricalGrid,
    Conditional,
    Section,
}

impl DataType {
    pub fn is_section(self) -> bool {
        matches!(self, DataType::Section)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Continuous => "Continuous",
            DataType::Categorical => "Categorical",
            DataType::Boolean => "Boolean",
            DataType::Date => "Date",
            DataType::Text => "Text",
            DataType::MultiSelect => "Multi-Select",
            DataType::Grid => "Grid",
            DataType::RankedMatrix => "Ranked-Matrix",
            DataType::CategoricalGrid => "Categorical-Grid",
            DataType::Conditional => "Conditional",
            DataType::Section => "Section",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analytic purpose of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleTag {
    Predictor,
    Outcome,
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointTier {
    Primary,
    Secondary,
    Exploratory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMethod {
    Survival,
    Frequency,
    MeanComparison,
    NonParametric,
    ChiSquare,
}

/// Coarse classification of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Demographics,
    Treatments,
    Endpoints,
    Clinical,
    Laboratory,
    Structural,
    Vitals,
    Labs,
    Safety,
    Efficacy,
    #[serde(rename = "Quality of Life")]
    QualityOfLife,
    #[serde(rename = "Medical History")]
    MedicalHistory,
    Biomarkers,
    Imaging,
    Medications,
    #[serde(rename = "Adverse Events")]
    AdverseEvents,
    Procedures,
    Questionnaires,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Demographics => "Demographics",
            Category::Treatments => "Treatments",
            Category::Endpoints => "Endpoints",
            Category::Clinical => "Clinical",
            Category::Laboratory => "Laboratory",
            Category::Structural => "Structural",
            Category::Vitals => "Vitals",
            Category::Labs => "Labs",
            Category::Safety => "Safety",
            Category::Efficacy => "Efficacy",
            Category::QualityOfLife => "Quality of Life",
            Category::MedicalHistory => "Medical History",
            Category::Biomarkers => "Biomarkers",
            Category::Imaging => "Imaging",
            Category::Medications => "Medications",
            Category::AdverseEvents => "Adverse Events",
            Category::Procedures => "Procedures",
            Category::Questionnaires => "Questionnaires",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation handle (icon name) attached to library-backed nodes.
///
/// Derived data: never persisted, restored by rehydration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconHandle(pub String);

impl IconHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One field or section of the protocol schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    pub id: NodeId,

    /// Stable identifier of the linked library variable
    pub variable_id: String,

    /// Library name of the linked variable
    pub variable_name: String,

    pub category: Category,

    pub data_type: DataType,

    pub role: RoleTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_tier: Option<EndpointTier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_method: Option<AnalysisMethod>,

    /// Explicit display name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,

    #[serde(default)]
    pub is_custom: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default)]
    pub is_expanded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<String>,

    /// Nodes whose values control this node's visibility
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<NodeId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grid_items: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grid_categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matrix_rows: Vec<String>,

    #[serde(skip)]
    pub icon: Option<IconHandle>,

    /// Ordered child ids; always empty for leaf kinds
    #[serde(skip)]
    pub(crate) children: Vec<NodeId>,
}

impl SchemaNode {
    /// Create a node bound to a library variable, using the variable's defaults
    pub fn from_variable(id: NodeId, variable: &Variable) -> Self {
        let is_section = variable.default_type.is_section();

        Self {
            id,
            variable_id: variable.id.clone(),
            variable_name: variable.name.clone(),
            category: variable.category,
            data_type: variable.default_type,
            role: RoleTag::Structure,
            endpoint_tier: None,
            analysis_method: None,
            custom_name: is_section.then(|| UNTITLED_SECTION.to_string()),
            is_custom: variable.is_custom,
            unit: variable.default_unit.clone(),
            is_expanded: true,
            version_tag: Some(DEFAULT_VERSION_TAG.to_string()),
            dependencies: Vec::new(),
            options: variable.options.clone(),
            grid_items: variable.grid_items.clone(),
            grid_categories: variable.grid_categories.clone(),
            matrix_rows: variable.matrix_rows.clone(),
            icon: variable.icon.clone(),
            children: Vec::new(),
        }
    }

    /// Create a leaf field with a custom definition
    pub fn field(id: impl Into<NodeId>, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            variable_id: "custom".to_string(),
            variable_name: name.clone(),
            category: Category::Other,
            data_type,
            role: RoleTag::Structure,
            endpoint_tier: None,
            analysis_method: None,
            custom_name: Some(name),
            is_custom: true,
            unit: None,
            is_expanded: true,
            version_tag: Some(DEFAULT_VERSION_TAG.to_string()),
            dependencies: Vec::new(),
            options: Vec::new(),
            grid_items: Vec::new(),
            grid_categories: Vec::new(),
            matrix_rows: Vec::new(),
            icon: None,
            children: Vec::new(),
        }
    }

    /// Create an empty section container
    pub fn section(id: impl Into<NodeId>, name: Option<&str>) -> Self {
        Self {
            variable_id: "section".to_string(),
            variable_name: "Section Container".to_string(),
            category: Category::Structural,
            custom_name: Some(name.unwrap_or(UNTITLED_SECTION).to_string()),
            is_custom: false,
            ..Self::field(id, "", DataType::Section)
        }
    }

    pub fn with_role(mut self, role: RoleTag) -> Self {
        self.role = role;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_endpoint_tier(mut self, tier: EndpointTier) -> Self {
        self.endpoint_tier = Some(tier);
        self
    }

    pub fn is_section(&self) -> bool {
        self.data_type.is_section()
    }

    /// Name shown for this node: the override, else the library name
    pub fn display_name(&self) -> &str {
        match &self.custom_name {
            Some(name) => name,
            None if self.is_section() => UNTITLED_SECTION,
            None => &self.variable_name,
        }
    }

    /// Ordered child ids (empty for leaf kinds)
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_display_name_defaults() {
        let mut section = SchemaNode::section("s1", None);
        assert_eq!(section.display_name(), UNTITLED_SECTION);

        section.custom_name = None;
        assert_eq!(section.display_name(), UNTITLED_SECTION);
    }

    #[test]
    fn test_field_display_name_falls_back_to_variable() {
        let mut field = SchemaNode::field("f1", "Age at Onset", DataType::Continuous);
        assert_eq!(field.display_name(), "Age at Onset");

        field.custom_name = None;
        field.variable_name = "Age".to_string();
        assert_eq!(field.display_name(), "Age");
    }

    #[test]
    fn test_enum_wire_names() {
        let json = serde_json::to_string(&DataType::CategoricalGrid).unwrap();
        assert_eq!(json, "\"Categorical-Grid\"");

        let method: AnalysisMethod = serde_json::from_str("\"mean-comparison\"").unwrap();
        assert_eq!(method, AnalysisMethod::MeanComparison);

        let category: Category = serde_json::from_str("\"Quality of Life\"").unwrap();
        assert_eq!(category, Category::QualityOfLife);
    }

    #[test]
    fn test_icon_and_children_not_serialized() {
        let mut node = SchemaNode::field("f1", "Dose", DataType::Continuous);
        node.icon = Some(IconHandle::new("pill"));

        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("icon").is_none());
        assert!(json.get("children").is_none());
        assert_eq!(json["dataType"], "Continuous");
    }
}
