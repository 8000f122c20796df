//! Forest builder: reconstructs nested trees from flat parent-linked records.

use std::collections::HashSet;

use tracing::{instrument, trace};

use crate::domain::entities::{CategoryNode, CategoryRecord, ROOT_PARENT_ID};
use crate::domain::error::DomainError;
use crate::domain::tree::{forest_ids, Hierarchical, TreeNode};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Constructs forests from flat record sequences.
///
/// Children are selected by scanning the full input for each node, so sibling
/// order always follows input order. Records whose parent chain never reaches
/// the root are left out.
#[derive(Debug, Clone)]
pub struct ForestBuilder {
    root_parent_id: u64,
    max_depth: usize,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self {
            root_parent_id: ROOT_PARENT_ID,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_root(mut self, root_parent_id: u64) -> Self {
        self.root_parent_id = root_parent_id;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root_parent_id(&self) -> u64 {
        self.root_parent_id
    }

    /// Build the forest rooted at the configured parent id.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build<T>(&self, records: &[T]) -> TreeResult<Vec<TreeNode<T>>>
    where
        T: Hierarchical + Clone,
    {
        let mut path = HashSet::new();
        self.build_level(records, self.root_parent_id, 1, &mut path)
    }

    fn build_level<T>(
        &self,
        records: &[T],
        parent_id: u64,
        depth: usize,
        path: &mut HashSet<u64>,
    ) -> TreeResult<Vec<TreeNode<T>>>
    where
        T: Hierarchical + Clone,
    {
        let mut nodes = Vec::new();

        for record in records.iter().filter(|r| r.parent_id() == parent_id) {
            let id = record.node_id();

            // Cycle detection: id already on the ancestor path
            if !path.insert(id) {
                return Err(DomainError::CycleDetected(id));
            }
            if depth > self.max_depth {
                return Err(DomainError::DepthExceeded {
                    id,
                    max_depth: self.max_depth,
                });
            }

            trace!(id, parent_id, depth, "attach node");
            let children = self.build_level(records, id, depth + 1, path)?;
            path.remove(&id);

            nodes.push(TreeNode::with_children(record.clone(), children));
        }

        Ok(nodes)
    }
}

/// Build the category forest rooted at `root_parent_id` with the default depth limit.
pub fn build_forest(
    categories: &[CategoryRecord],
    root_parent_id: u64,
) -> TreeResult<Vec<CategoryNode>> {
    ForestBuilder::new().with_root(root_parent_id).build(categories)
}

/// Records that did not make it into the forest, in input order.
pub fn orphans<'a, T: Hierarchical>(records: &'a [T], forest: &[TreeNode<T>]) -> Vec<&'a T> {
    let reachable = forest_ids(forest);
    records
        .iter()
        .filter(|r| !reachable.contains(&r.node_id()))
        .collect()
}
