//! Mismatch detection over realistic protocol layouts

use workbench_linter::{detect_mismatches, lint_forest, LintOptions, RuleRegistry};
use workbench_model::{
    Category, DataType, EndpointTier, Forest, NodeId, RoleTag, SchemaNode, Variable,
    VariableLibrary,
};

struct Builder {
    forest: Forest,
}

impl Builder {
    fn new() -> Self {
        Self {
            forest: Forest::new(),
        }
    }

    fn add(mut self, node: SchemaNode, parent: Option<&str>) -> Self {
        let id = node.id.clone();
        let mut edit = self.forest.edit();
        edit.insert(node).unwrap();
        edit.attach(&id, parent.map(NodeId::new).as_ref(), None).unwrap();
        self.forest = edit.finish();
        self
    }

    fn variable(self, id: &str, variable: &Variable, parent: &str) -> Self {
        self.add(SchemaNode::from_variable(NodeId::new(id), variable), Some(parent))
    }

    fn build(self) -> Forest {
        self.forest
    }
}

#[test]
fn test_library_variables_in_wrong_sections() {
    let library = VariableLibrary::builtin();
    let forest = Builder::new()
        .add(SchemaNode::section("demo", Some("Demographics")), None)
        .variable("age", library.get("age").unwrap(), "demo")
        .variable("dose", library.get("dose").unwrap(), "demo")
        .add(SchemaNode::section("tx", Some("Treatment Arm")), None)
        .variable("hgb", library.get("hemoglobin").unwrap(), "tx")
        .add(SchemaNode::section("eff", Some("Efficacy Endpoints")), None)
        .variable("sex", library.get("sex").unwrap(), "eff")
        .build();

    let findings = detect_mismatches(&forest);
    let fired: Vec<(&str, &str)> = findings
        .iter()
        .map(|f| (f.node_id.as_str(), f.rule.as_str()))
        .collect();

    assert_eq!(
        fired,
        vec![
            ("dose", "treatment-under-demographics"),
            ("hgb", "laboratory-under-treatment"),
            ("sex", "demographics-under-outcome"),
        ]
    );
}

#[test]
fn test_primary_outcome_under_demographics() {
    let forest = Builder::new()
        .add(SchemaNode::section("demo", Some("Demographics")), None)
        .add(
            SchemaNode::field("mortality", "90-day Mortality", DataType::Boolean)
                .with_role(RoleTag::Outcome)
                .with_endpoint_tier(EndpointTier::Primary),
            Some("demo"),
        )
        .build();

    let findings = detect_mismatches(&forest);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].node_id, NodeId::new("mortality"));
    assert_eq!(findings[0].parent_id, NodeId::new("demo"));
    assert_eq!(findings[0].rule, "outcome-under-demographics");
    assert_eq!(
        findings[0].reason,
        "Outcome endpoint \"90-day Mortality\" should not be nested under demographic/baseline section"
    );
}

#[test]
fn test_each_child_compared_with_immediate_parent_only() {
    // Outcome sits two levels below "Baseline"; its parent is "Follow-up"
    let forest = Builder::new()
        .add(SchemaNode::section("base", Some("Baseline")), None)
        .add(SchemaNode::section("fu", Some("Follow-up")), Some("base"))
        .add(
            SchemaNode::field("stroke", "Recurrent Stroke", DataType::Boolean)
                .with_role(RoleTag::Outcome),
            Some("fu"),
        )
        .build();

    assert!(detect_mismatches(&forest).is_empty());
}

#[test]
fn test_nested_section_is_checked_as_child() {
    let forest = Builder::new()
        .add(SchemaNode::section("out", Some("Outcomes")), None)
        .add(SchemaNode::section("proc", Some("Procedure details")), Some("out"))
        .add(
            SchemaNode::field("surgery", "Surgery Type", DataType::Categorical),
            Some("proc"),
        )
        .build();

    let findings = detect_mismatches(&forest);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].node_id, NodeId::new("proc"));
    assert_eq!(findings[0].rule, "procedure-under-outcome");
    assert_eq!(findings[0].parent_id, NodeId::new("out"));
}

#[test]
fn test_assessment_scores_under_identification() {
    let forest = Builder::new()
        .add(SchemaNode::section("id", Some("Patient Identification")), None)
        .add(
            SchemaNode::field("mrs", "Modified Rankin Scale", DataType::Categorical)
                .with_category(Category::Clinical),
            Some("id"),
        )
        .build();

    let findings = detect_mismatches(&forest);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, "assessment-under-demographics");
    assert_eq!(
        findings[0].reason,
        "Clinical assessment \"Modified Rankin Scale\" should be in assessments section, not demographics"
    );
}

#[test]
fn test_custom_rules_run_after_builtins() {
    let forest = Builder::new()
        .add(SchemaNode::section("labs", Some("Lab Panel")), None)
        .add(
            SchemaNode::field("mri", "Brain MRI", DataType::Text).with_category(Category::Imaging),
            Some("labs"),
        )
        .build();

    let mut registry = RuleRegistry::new();
    registry
        .extend_from_json(
            r#"[{
                "name": "imaging-under-labs",
                "when": { "allOf": [ { "categoryIs": "Imaging" }, { "parentNameContains": ["lab"] } ] },
                "reason": "Imaging study \"{name}\" belongs in an imaging section"
            }]"#,
        )
        .unwrap();

    let findings = lint_forest(
        &forest,
        &LintOptions {
            registry: Some(registry),
            ..Default::default()
        },
    );

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].reason, "Imaging study \"Brain MRI\" belongs in an imaging section");
}
