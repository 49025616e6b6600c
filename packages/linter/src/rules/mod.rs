mod builtin;
mod condition;

pub use builtin::builtin_rules;
pub use condition::{Condition, Pattern};

use crate::diagnostic::{DiagnosticLevel, Finding};
use condition::Placement;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use workbench_model::SchemaNode;

/// Trait for implementing placement rules
pub trait LintRule {
    /// Unique identifier for this rule
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Check one child against its immediate parent section
    fn check(&self, child: &SchemaNode, parent: &SchemaNode) -> Option<Finding>;
}

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Invalid rule table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),
}

/// A data-driven placement rule: a condition plus a reason template.
///
/// `{name}` in the reason is replaced with the child's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchRule {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub when: Condition,

    pub reason: String,

    #[serde(default)]
    pub level: DiagnosticLevel,
}

impl MismatchRule {
    pub fn new(name: impl Into<String>, when: Condition, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            when,
            reason: reason.into(),
            level: DiagnosticLevel::Warning,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level: DiagnosticLevel) -> Self {
        self.level = level;
        self
    }

    /// Parse a JSON array of rules
    pub fn parse_table(json: &str) -> Result<Vec<MismatchRule>, LintError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LintRule for MismatchRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, child: &SchemaNode, parent: &SchemaNode) -> Option<Finding> {
        if !self.when.eval(&Placement::new(child, parent)) {
            return None;
        }
        let reason = self.reason.replace("{name}", child.display_name());
        Some(Finding::new(child.id.clone(), parent.id.clone(), &self.name, reason).with_level(self.level))
    }
}

/// Ordered registry of placement rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for rule in builtin_rules() {
            registry.rules.push(Box::new(rule));
        }
        registry
    }

    /// Get all registered rules, in evaluation order
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    /// Append a rule; it is evaluated after every existing rule
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) -> Result<(), LintError> {
        if self.contains(rule.name()) {
            return Err(LintError::DuplicateRule(rule.name().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Append every rule from a JSON rule table, returning how many were added
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, LintError> {
        let table = MismatchRule::parse_table(json)?;
        let count = table.len();
        for rule in table {
            self.add_rule(Box::new(rule))?;
        }
        Ok(count)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
