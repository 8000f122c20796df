//! Infrastructure layer: content access and DI container
//!
//! This layer implements the content boundary trait and wires up services.

pub mod di;
pub mod error;
pub mod snapshot;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use snapshot::SnapshotSource;
pub use traits::{ContentSource, PageQuery, PostQuery};
