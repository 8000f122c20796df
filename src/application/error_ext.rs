//! Error conversion helpers
//!
//! Extension traits that attach the offending path to I/O and TOML errors
//! while lifting them into `ApplicationError`.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Lift an `io::Result` into `ApplicationResult` with path context.
pub trait IoResultExt<T> {
    /// ```ignore
    /// fs::write(&out, html).with_path_context("write sitemap", &out)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{action} {}", path.display()),
            source: Box::new(e),
        })
    }
}

/// Turn a TOML parse failure into a config error naming the file.
pub trait TomlResultExt<T> {
    fn config_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> TomlResultExt<T> for Result<T, toml::de::Error> {
    fn config_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e.message()),
        })
    }
}
