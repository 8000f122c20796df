//! Service container for dependency injection
//!
//! Wires the content source and services up from settings.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::SitemapService;
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::snapshot::SnapshotSource;
use crate::infrastructure::traits::ContentSource;

/// Container holding the application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Where categories, posts and pages come from
    pub source: Arc<dyn ContentSource>,

    pub sitemap: SitemapService,
}

impl ServiceContainer {
    /// Load the snapshot at `snapshot`, falling back to the configured one.
    pub fn new(settings: Settings, snapshot: Option<&Path>) -> InfraResult<Self> {
        let path = snapshot
            .map(Path::to_path_buf)
            .or_else(|| settings.snapshot.clone())
            .ok_or_else(|| InfraError::Snapshot {
                origin: "<none>".into(),
                message: "no snapshot given (use --snapshot or set `snapshot` in config)".into(),
            })?;
        debug!("snapshot: {}", path.display());

        let source = SnapshotSource::load(&path)?;
        Ok(Self::with_deps(settings, Arc::new(source)))
    }

    /// Create a service container with a custom content source (for testing).
    pub fn with_deps(settings: Settings, source: Arc<dyn ContentSource>) -> Self {
        let settings = Arc::new(settings);
        let sitemap = SitemapService::new(source.clone());

        Self {
            settings,
            source,
            sitemap,
        }
    }
}
