//! Shared traversal for workbench tooling.

pub mod visitor;

pub use visitor::*;
