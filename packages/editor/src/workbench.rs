//! Workbench lifecycle state and the mutations each state permits.
//!
//! | State            | Remove | Reorder | Other edits |
//! |------------------|--------|---------|-------------|
//! | `blueprint`      | yes    | yes     | yes         |
//! | `mapping`        | yes    | yes     | yes         |
//! | `review-mapping` | no     | no      | yes         |
//! | `production`     | no     | no      | yes         |
//! | `archived`       | no     | no      | expand only |

use crate::mutations::Mutation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkbenchState {
    #[default]
    Blueprint,
    Mapping,
    ReviewMapping,
    Production,
    Archived,
}

impl WorkbenchState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkbenchState::Blueprint => "blueprint",
            WorkbenchState::Mapping => "mapping",
            WorkbenchState::ReviewMapping => "review-mapping",
            WorkbenchState::Production => "production",
            WorkbenchState::Archived => "archived",
        }
    }

    /// Whether removal and reordering are disabled
    pub fn locks_structure(self) -> bool {
        matches!(
            self,
            WorkbenchState::ReviewMapping | WorkbenchState::Production | WorkbenchState::Archived
        )
    }

    pub fn is_read_only(self) -> bool {
        self == WorkbenchState::Archived
    }

    /// Whether `mutation` may run in this state
    pub fn permits(self, mutation: &Mutation) -> bool {
        if self.is_read_only() {
            return matches!(mutation, Mutation::ToggleExpand { .. });
        }
        if self.locks_structure() && (mutation.is_reorder() || mutation.is_removal()) {
            return false;
        }
        true
    }
}

impl fmt::Display for WorkbenchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkbenchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            WorkbenchState::Blueprint,
            WorkbenchState::Mapping,
            WorkbenchState::ReviewMapping,
            WorkbenchState::Production,
            WorkbenchState::Archived,
        ]
        .into_iter()
        .find(|state| state.as_str() == s)
        .ok_or_else(|| format!("Unknown workbench state: {s}"))
    }
}
