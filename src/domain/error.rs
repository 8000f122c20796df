//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in hierarchy at id {0}")]
    CycleDetected(u64),

    #[error("hierarchy deeper than {max_depth} levels at id {id}")]
    DepthExceeded { id: u64, max_depth: usize },
}
