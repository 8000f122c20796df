//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod markup;
pub mod tree;

pub use builder::{build_forest, orphans, ForestBuilder, TreeResult, DEFAULT_MAX_DEPTH};
pub use entities::*;
pub use error::DomainError;
pub use tree::{forest_depth, forest_ids, forest_size, Hierarchical, TreeNode};
