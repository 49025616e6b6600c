//! Library of known variable definitions.
//!
//! Consulted when a node is created from a variable and when a persisted
//! forest is rehydrated (icon handles are not stored).

use crate::node::{Category, DataType, IconHandle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A known variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub default_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
    #[serde(default)]
    pub is_pii: bool,
    #[serde(default)]
    pub is_custom: bool,
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
}

impl Variable {
    pub fn new(id: &str, name: &str, category: Category, default_type: DataType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            default_type,
            default_unit: None,
            is_pii: false,
            is_custom: false,
            options: Vec::new(),
            grid_items: Vec::new(),
            grid_categories: Vec::new(),
            matrix_rows: Vec::new(),
            icon: None,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.default_unit = Some(unit.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(IconHandle::new(icon));
        self
    }

    pub fn pii(mut self) -> Self {
        self.is_pii = true;
        self
    }
}

/// Lookup table of variables keyed by their stable identifier
#[derive(Debug, Clone, Default)]
pub struct VariableLibrary {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariableLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard library shipped with the workbench
    pub fn builtin() -> Self {
        use Category::*;
        use DataType::*;

        let mut library = Self::new();
        for variable in [
            // Structural
            Variable::new("section", "Section Container", Structural, Section).with_icon("folder"),
            Variable::new("custom", "Custom Field", Structural, Text).with_icon("edit-3"),
            // Demographics
            Variable::new("age", "Age", Demographics, Continuous)
                .with_unit("years")
                .with_icon("calendar"),
            Variable::new("sex", "Sex", Demographics, Categorical).with_icon("users"),
            Variable::new("patient_id", "Patient ID", Demographics, Text)
                .with_icon("hash")
                .pii(),
            Variable::new("dob", "Date of Birth", Demographics, Date)
                .with_icon("calendar")
                .pii(),
            Variable::new("initials", "Patient Initials", Demographics, Text)
                .with_icon("file-text")
                .pii(),
            // Clinical
            Variable::new("comorbidities", "Co-existing Diseases", Clinical, MultiSelect)
                .with_icon("check-square"),
            Variable::new("hypertension", "Hypertension", Clinical, Boolean).with_icon("activity"),
            Variable::new("cad", "Coronary Artery Disease", Clinical, Boolean)
                .with_icon("activity"),
            Variable::new("dissection_type", "Dissection Type", Clinical, Conditional)
                .with_icon("git-branch"),
            Variable::new("svs_classification", "SVS/STS Classification", Clinical, Grid)
                .with_icon("grid-3x3"),
            Variable::new("stentgraft_type", "Stent-graft Type", Clinical, Categorical)
                .with_icon("pill"),
            // Laboratory
            Variable::new("hemoglobin", "Hemoglobin", Laboratory, Continuous)
                .with_unit("g/dL")
                .with_icon("droplet"),
            Variable::new("egfr", "eGFR", Laboratory, Continuous)
                .with_unit("mL/min/1.73m²")
                .with_icon("activity"),
            Variable::new("creatinine", "Creatinine", Laboratory, Continuous)
                .with_unit("mg/dL")
                .with_icon("droplet"),
            // Treatments
            Variable::new("dose", "Dose", Treatments, Continuous)
                .with_unit("mg")
                .with_icon("pill"),
            Variable::new("treatment_arm", "Treatment Arm", Treatments, Categorical)
                .with_icon("toggle-left"),
            Variable::new("revascularization", "Revascularization Order", Treatments, RankedMatrix)
                .with_icon("grid-3x3"),
            // Endpoints
            Variable::new("os", "Overall Survival (OS)", Endpoints, Continuous)
                .with_unit("months")
                .with_icon("target"),
            Variable::new("pfs", "Progression-Free Survival (PFS)", Endpoints, Continuous)
                .with_unit("months")
                .with_icon("target"),
            Variable::new("mortality_30d", "30-Day Mortality", Endpoints, Boolean)
                .with_icon("target"),
        ] {
            library.insert(variable);
        }
        library
    }

    /// Add or replace a variable definition
    pub fn insert(&mut self, variable: Variable) {
        match self.index.get(&variable.id) {
            Some(&slot) => self.variables[slot] = variable,
            None => {
                self.index.insert(variable.id.clone(), self.variables.len());
                self.variables.push(variable);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Variable> {
        self.index.get(id).map(|&slot| &self.variables[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let library = VariableLibrary::builtin();

        let age = library.get("age").unwrap();
        assert_eq!(age.category, Category::Demographics);
        assert_eq!(age.default_unit.as_deref(), Some("years"));
        assert_eq!(age.icon.as_ref().map(IconHandle::as_str), Some("calendar"));

        assert!(library.get("unknown").is_none());
        assert!(library.iter().all(|v| v.icon.is_some()));
    }

    #[test]
    fn test_insert_replaces_existing_definition() {
        let mut library = VariableLibrary::builtin();
        let before = library.len();

        library.insert(Variable::new("age", "Age at Enrollment", Category::Demographics, DataType::Continuous));

        assert_eq!(library.len(), before);
        assert_eq!(library.get("age").unwrap().name, "Age at Enrollment");
    }
}
