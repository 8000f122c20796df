//! Test support: logging setup and an in-memory content source.

use std::collections::BTreeSet;
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{CategoryRecord, PostRecord, PostStatus};
use crate::infrastructure::traits::{ContentSource, PageQuery, PostQuery};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = [""];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| !name.is_empty() && metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Category record with a predictable link.
pub fn category(id: u64, name: &str, parent_id: u64) -> CategoryRecord {
    CategoryRecord {
        id,
        name: name.to_string(),
        parent_id,
        link: format!("https://example.com/?cat={id}"),
    }
}

/// Public post with a predictable permalink.
pub fn post(id: u64, title: &str, primary_category_id: Option<u64>) -> PostRecord {
    PostRecord {
        id,
        title: title.to_string(),
        permalink: format!("https://example.com/?p={id}"),
        primary_category_id,
        status: PostStatus::Public,
    }
}

/// In-memory `ContentSource` that records the queries it receives.
///
/// Posts are stored with their full category set; the primary category is
/// whatever the `PostRecord` says. Status filtering and sorting are left to
/// the caller's fixture data.
#[derive(Debug, Default)]
pub struct StaticSource {
    pub categories: Vec<CategoryRecord>,
    pub posts: Vec<(PostRecord, Vec<u64>)>,
    pub page_markup: String,
    queries: Mutex<Vec<PostQuery>>,
    page_queries: Mutex<Vec<PageQuery>>,
}

impl StaticSource {
    pub fn new(categories: Vec<CategoryRecord>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Add a post assigned to `categories`; the first one becomes its primary category.
    pub fn with_post(mut self, id: u64, title: &str, categories: &[u64]) -> Self {
        let record = post(id, title, categories.first().copied());
        self.posts.push((record, categories.to_vec()));
        self
    }

    pub fn with_page_markup(mut self, markup: &str) -> Self {
        self.page_markup = markup.to_string();
        self
    }

    /// Post queries seen so far.
    pub fn queries(&self) -> Vec<PostQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Page list queries seen so far.
    pub fn page_queries(&self) -> Vec<PageQuery> {
        self.page_queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl ContentSource for StaticSource {
    fn fetch_categories(&self, exclude_ids: &BTreeSet<u64>) -> Vec<CategoryRecord> {
        self.categories
            .iter()
            .filter(|c| !exclude_ids.contains(&c.id))
            .cloned()
            .collect()
    }

    fn fetch_posts(&self, query: &PostQuery) -> Vec<PostRecord> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        self.posts
            .iter()
            .filter(|(p, cats)| cats.contains(&query.category_id) && !query.exclude_ids.contains(&p.id))
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn fetch_flat_page_list(&self, query: &PageQuery) -> String {
        if let Ok(mut queries) = self.page_queries.lock() {
            queries.push(query.clone());
        }
        self.page_markup.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_static_source_when_fetching_posts_then_records_query() {
        let source = StaticSource::new(vec![category(1, "A", 0)]).with_post(10, "P", &[1]);
        let posts = source.fetch_posts(&PostQuery {
            category_id: 1,
            ..PostQuery::default()
        });
        assert_eq!(posts.len(), 1);
        assert_eq!(source.queries().len(), 1);
    }
}
