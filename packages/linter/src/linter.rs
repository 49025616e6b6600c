use crate::diagnostic::Finding;
use crate::rules::{LintRule, RuleRegistry};
use tracing::debug;
use workbench_common::{walk_section, Visitor};
use workbench_model::{Forest, SchemaNode};

/// Options for configuring the linter
#[derive(Debug, Default)]
pub struct LintOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,

    /// Rule names to skip
    pub disabled_rules: Vec<String>,
}

/// Detect misplaced nodes with the built-in rule table
pub fn detect_mismatches(forest: &Forest) -> Vec<Finding> {
    lint_forest(forest, &LintOptions::default())
}

/// Check every section's direct children against the rule table.
///
/// Each child is compared only with its immediate parent; the first
/// matching rule wins, so a node yields at most one finding. Findings
/// come back in depth-first forest order.
pub fn lint_forest(forest: &Forest, options: &LintOptions) -> Vec<Finding> {
    let builtin;
    let registry = match &options.registry {
        Some(registry) => registry,
        None => {
            builtin = RuleRegistry::default();
            &builtin
        }
    };
    let rules: Vec<&dyn LintRule> = registry
        .rules()
        .iter()
        .map(|rule| &**rule)
        .filter(|rule| !options.disabled_rules.iter().any(|name| name == rule.name()))
        .collect();

    let mut checker = PlacementChecker {
        rules,
        findings: Vec::new(),
    };
    checker.visit_forest(forest);

    debug!(
        nodes = forest.len(),
        findings = checker.findings.len(),
        "Mismatch detection complete"
    );
    checker.findings
}

struct PlacementChecker<'r> {
    rules: Vec<&'r dyn LintRule>,
    findings: Vec<Finding>,
}

impl PlacementChecker<'_> {
    fn check(&mut self, child: &SchemaNode, parent: Option<&SchemaNode>) {
        let Some(parent) = parent else {
            return;
        };
        if let Some(finding) = self.rules.iter().find_map(|rule| rule.check(child, parent)) {
            self.findings.push(finding);
        }
    }
}

impl Visitor for PlacementChecker<'_> {
    fn visit_section(&mut self, forest: &Forest, section: &SchemaNode, parent: Option<&SchemaNode>) {
        self.check(section, parent);
        walk_section(self, forest, section);
    }

    fn visit_field(&mut self, field: &SchemaNode, parent: Option<&SchemaNode>) {
        self.check(field, parent);
    }
}
