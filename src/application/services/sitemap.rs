//! Sitemap service
//!
//! Composes the complete sitemap block: an optional page list section and
//! an optional section of posts grouped by category.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::leaves::LeafCollector;
use crate::application::services::pages::PageListFormatter;
use crate::application::services::renderer::TreeRenderer;
use crate::application::ApplicationResult;
use crate::domain::markup::{block, class, escape_html};
use crate::domain::{
    orphans, CategoryNode, CategoryRecord, ForestBuilder, Labels, RenderOptions,
    DEFAULT_MAX_DEPTH, ROOT_PARENT_ID,
};
use crate::infrastructure::traits::{ContentSource, PageQuery};

/// Everything one sitemap render needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapRequest {
    pub map_pages: bool,
    pub map_posts: bool,
    /// Emit the "Pages"/"Posts" section titles
    pub display_titles: bool,
    pub root_parent_id: u64,
    pub max_depth: usize,
    pub options: RenderOptions,
    pub labels: Labels,
}

impl Default for SitemapRequest {
    fn default() -> Self {
        Self {
            map_pages: true,
            map_posts: true,
            display_titles: true,
            root_parent_id: ROOT_PARENT_ID,
            max_depth: DEFAULT_MAX_DEPTH,
            options: RenderOptions::default(),
            labels: Labels::default(),
        }
    }
}

/// Category forest plus the categories that could not be attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForest {
    pub forest: Vec<CategoryNode>,
    pub orphans: Vec<CategoryRecord>,
}

/// Service producing sitemap markup from a content source.
pub struct SitemapService {
    source: Arc<dyn ContentSource>,
    pages: PageListFormatter,
}

impl SitemapService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            pages: PageListFormatter,
        }
    }

    /// Render the full sitemap block.
    #[instrument(level = "debug", skip_all, fields(pages = request.map_pages, posts = request.map_posts))]
    pub fn render(&self, request: &SitemapRequest) -> ApplicationResult<String> {
        let mut html = String::new();

        if request.map_pages {
            html.push_str(&self.render_pages(request));
        }
        if request.map_posts {
            html.push_str(&self.render_posts(request)?);
        }

        Ok(block(class::WRAPPER, &html))
    }

    /// Page list section, empty when there are no pages.
    pub fn render_pages(&self, request: &SitemapRequest) -> String {
        let options = &request.options;
        let query = PageQuery::new(options, request.max_depth);
        let markup = self.source.fetch_flat_page_list(&query);
        let title = if request.display_titles {
            request.labels.pages_title.as_str()
        } else {
            ""
        };
        self.pages.format(&markup, title, options.add_nofollow)
    }

    /// Posts-by-category section, empty when no category is reachable.
    pub fn render_posts(&self, request: &SitemapRequest) -> ApplicationResult<String> {
        let CategoryForest { forest, .. } = self.category_forest(request)?;

        let renderer = TreeRenderer::new(LeafCollector::new(self.source.clone()), &request.labels);
        let tree_html = renderer.render_forest(&forest, &request.options);
        if tree_html.is_empty() {
            return Ok(String::new());
        }

        let mut html = String::new();
        if request.display_titles {
            html.push_str(&block(
                class::POSTS_TITLE,
                &escape_html(&request.labels.posts_title),
            ));
        }
        html.push_str(&tree_html);
        Ok(html)
    }

    /// Fetch categories and build the forest configured by `request`.
    pub fn category_forest(&self, request: &SitemapRequest) -> ApplicationResult<CategoryForest> {
        let categories = self
            .source
            .fetch_categories(&request.options.exclude_category_ids);

        let forest = ForestBuilder::new()
            .with_root(request.root_parent_id)
            .with_max_depth(request.max_depth)
            .build(&categories)?;

        let orphans: Vec<CategoryRecord> = orphans(&categories, &forest)
            .into_iter()
            .cloned()
            .collect();
        if !orphans.is_empty() {
            debug!(
                count = orphans.len(),
                "categories not reachable from root {}", request.root_parent_id
            );
        }

        Ok(CategoryForest { forest, orphans })
    }
}
