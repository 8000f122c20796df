//! Owned tree nodes for parent-linked records.

use std::collections::HashSet;
use std::fmt;

use termtree::Tree;

/// A record that knows its own id and the id of its parent.
pub trait Hierarchical {
    fn node_id(&self) -> u64;
    fn parent_id(&self) -> u64;
}

/// Tree node wrapping an immutable record and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    /// Record for this node
    pub record: T,
    /// Child nodes in input order
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn with_children(record: T, children: Vec<TreeNode<T>>) -> Self {
        Self { record, children }
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Records in pre-order (node before its children).
    pub fn iter_preorder(&self) -> Vec<&T> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(&node.record);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

impl<T: Hierarchical> TreeNode<T> {
    pub fn id(&self) -> u64 {
        self.record.node_id()
    }
}

impl<T: fmt::Display> TreeNode<T> {
    /// Converts the subtree into a printable `termtree::Tree`.
    pub fn to_termtree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(TreeNode::to_termtree).collect();
        Tree::new(self.record.to_string()).with_leaves(leaves)
    }
}

/// Total node count of a forest.
pub fn forest_size<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::count).sum()
}

/// Depth of the deepest tree in a forest, 0 for an empty forest.
pub fn forest_depth<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::depth).max().unwrap_or(0)
}

/// Ids of every node in a forest.
pub fn forest_ids<T: Hierarchical>(forest: &[TreeNode<T>]) -> HashSet<u64> {
    forest
        .iter()
        .flat_map(|tree| tree.iter_preorder())
        .map(Hierarchical::node_id)
        .collect()
}
