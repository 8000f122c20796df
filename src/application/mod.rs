//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on the content boundary trait.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, TomlResultExt};
