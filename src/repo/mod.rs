//! Repository discovery.
//!
//! This module resolves the ecosystem manifest into the set of
//! repositories to measure.

pub mod reference;
pub mod set_builder;

pub use reference::parse_repo_reference;
pub use set_builder::{RepositorySet, RepositorySetBuilder};
