//! Posts listed under a single category node.

use std::sync::Arc;

use tracing::trace;

use crate::domain::{PostRecord, RenderOptions};
use crate::infrastructure::traits::{ContentSource, PostQuery};

/// Collects the posts shown under one category.
///
/// A post tagged with several categories of the same branch is listed only
/// under its primary (first-listed) category, so it never repeats under
/// every ancestor.
#[derive(Clone)]
pub struct LeafCollector {
    source: Arc<dyn ContentSource>,
}

impl LeafCollector {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Posts whose primary category is exactly `category_id`.
    ///
    /// Status filtering is the content source's job: `options` is forwarded
    /// in the query and nothing is re-checked here.
    pub fn posts_for_category(&self, category_id: u64, options: &RenderOptions) -> Vec<PostRecord> {
        let query = PostQuery::for_category(category_id, options);
        let fetched = self.source.fetch_posts(&query);
        let total = fetched.len();

        let posts: Vec<PostRecord> = fetched
            .into_iter()
            .filter(|p| p.primary_category_id == Some(category_id))
            .collect();

        trace!(category_id, total, kept = posts.len(), "collected leaves");
        posts
    }
}
