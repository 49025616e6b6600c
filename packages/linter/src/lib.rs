mod diagnostic;
mod linter;
mod rules;

pub use diagnostic::{DiagnosticLevel, Finding};
pub use linter::{detect_mismatches, lint_forest, LintOptions};
pub use rules::{builtin_rules, Condition, LintError, LintRule, MismatchRule, Pattern, RuleRegistry};
