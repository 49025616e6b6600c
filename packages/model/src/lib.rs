//! # Workbench Model
//!
//! Data model for hierarchical protocol schemas: schema nodes, the
//! variable library, and the arena-backed [`Forest`] that owns them.
//!
//! ```text
//! Forest
//!  ├─ roots:   ordered root ids
//!  ├─ nodes:   id → Arc<SchemaNode>   (sections own ordered child ids)
//!  └─ parents: id → parent id         (derived reverse index)
//! ```
//!
//! Forests are persistent values. Editing goes through [`ForestEdit`],
//! which copies only what it touches, so earlier snapshots stay valid
//! for undo history and change detection.

mod error;
mod forest;
mod id;
mod library;
mod node;
mod patch;
mod persisted;

pub use error::ForestError;
pub use forest::{Forest, ForestEdit, Placement, Position, Walk, WalkEntry};
pub use id::{get_schema_id, IdGenerator, NodeId};
pub use library::{Variable, VariableLibrary};
pub use node::{
    AnalysisMethod, Category, DataType, EndpointTier, IconHandle, RoleTag, SchemaNode,
    DEFAULT_VERSION_TAG, UNTITLED_SECTION,
};
pub use patch::NodePatch;
pub use persisted::PersistedNode;
