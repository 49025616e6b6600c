use serde::{Deserialize, Serialize};
use std::fmt;
use workbench_model::NodeId;

/// Severity level of a finding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    #[default]
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        })
    }
}

/// A node placed under a section it does not semantically belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// The misplaced node
    pub node_id: NodeId,

    /// The section it was found under
    pub parent_id: NodeId,

    /// The rule that fired
    pub rule: String,

    /// Human-readable reason
    pub reason: String,

    pub level: DiagnosticLevel,
}

impl Finding {
    pub fn new(
        node_id: NodeId,
        parent_id: NodeId,
        rule: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            parent_id,
            rule: rule.into(),
            reason: reason.into(),
            level: DiagnosticLevel::Warning,
        }
    }

    pub fn with_level(mut self, level: DiagnosticLevel) -> Self {
        self.level = level;
        self
    }
}
