//! Content access boundary
//!
//! The sitemap core never fetches data itself; it asks a `ContentSource`.
//! Services hold it as `Arc<dyn ContentSource>` so tests can plug in
//! in-memory implementations.

use std::collections::BTreeSet;

use crate::domain::{
    CategoryRecord, PostRecord, RenderOptions, SortKey, SortOrder, DEFAULT_MAX_DEPTH,
};

/// Parameters for a post fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostQuery {
    /// Posts whose category set contains this id
    pub category_id: u64,
    /// Post ids to leave out
    pub exclude_ids: BTreeSet<u64>,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    /// Include password-protected posts; when false only public posts are returned
    pub include_password_protected: bool,
}

impl PostQuery {
    /// Query for one category using the fetch-related fields of `options`.
    pub fn for_category(category_id: u64, options: &RenderOptions) -> Self {
        Self {
            category_id,
            exclude_ids: options.exclude_page_ids.clone(),
            sort_key: options.sort_key,
            sort_order: options.sort_order,
            include_password_protected: options.include_password_protected,
        }
    }
}

/// Parameters for the flat page list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub exclude_ids: BTreeSet<u64>,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub include_password_protected: bool,
    /// Nesting limit for the page hierarchy
    pub max_depth: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            exclude_ids: BTreeSet::new(),
            sort_key: None,
            sort_order: None,
            include_password_protected: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PageQuery {
    /// Query using the fetch-related fields of `options` and the given depth limit.
    pub fn new(options: &RenderOptions, max_depth: usize) -> Self {
        Self {
            exclude_ids: options.exclude_page_ids.clone(),
            sort_key: options.sort_key,
            sort_order: options.sort_order,
            include_password_protected: options.include_password_protected,
            max_depth,
        }
    }
}

/// Read-only access to the site's content.
pub trait ContentSource: Send + Sync {
    /// All categories except `exclude_ids`, in source order.
    fn fetch_categories(&self, exclude_ids: &BTreeSet<u64>) -> Vec<CategoryRecord>;

    /// Posts assigned to `query.category_id` (any position in their category set).
    fn fetch_posts(&self, query: &PostQuery) -> Vec<PostRecord>;

    /// Pre-rendered `<li>` markup for the page list; empty when there are no pages.
    fn fetch_flat_page_list(&self, query: &PageQuery) -> String;
}
