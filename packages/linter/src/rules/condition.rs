//! Predicates over a (child, parent) placement.
//!
//! Conditions are plain data so rule tables can live in JSON:
//!
//! ```json
//! { "allOf": [
//!     { "anyOf": [ { "roleIs": "Outcome" }, "hasEndpointTier" ] },
//!     { "parentNameContains": ["demographic", "baseline"] }
//! ] }
//! ```
//!
//! Name checks are case-insensitive substring tests against display names.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use workbench_model::{Category, RoleTag, SchemaNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    RoleIs(RoleTag),
    HasEndpointTier,
    CategoryIs(Category),
    NameContains(Vec<String>),
    ParentNameContains(Vec<String>),
    NameMatches(Pattern),
    AnyOf(Vec<Condition>),
    AllOf(Vec<Condition>),
    Not(Box<Condition>),
}

/// Case-insensitive regular expression over a display name
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Lower-cased view of one placement, computed once per child
pub(crate) struct Placement<'a> {
    pub child: &'a SchemaNode,
    pub name: String,
    pub parent_name: String,
}

impl<'a> Placement<'a> {
    pub fn new(child: &'a SchemaNode, parent: &SchemaNode) -> Self {
        Self {
            child,
            name: child.display_name().to_lowercase(),
            parent_name: parent.display_name().to_lowercase(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

impl Condition {
    pub fn matches(&self, child: &SchemaNode, parent: &SchemaNode) -> bool {
        self.eval(&Placement::new(child, parent))
    }

    pub(crate) fn eval(&self, at: &Placement<'_>) -> bool {
        match self {
            Condition::RoleIs(role) => at.child.role == *role,
            Condition::HasEndpointTier => at.child.endpoint_tier.is_some(),
            Condition::CategoryIs(category) => at.child.category == *category,
            Condition::NameContains(needles) => contains_any(&at.name, needles),
            Condition::ParentNameContains(needles) => contains_any(&at.parent_name, needles),
            Condition::NameMatches(pattern) => pattern.is_match(&at.name),
            Condition::AnyOf(conditions) => conditions.iter().any(|c| c.eval(at)),
            Condition::AllOf(conditions) => conditions.iter().all(|c| c.eval(at)),
            Condition::Not(condition) => !condition.eval(at),
        }
    }
}
