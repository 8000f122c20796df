//! JSON content snapshot implementing `ContentSource`.
//!
//! A snapshot is an export of the site's categories, posts and pages. Entries
//! that cannot be read (missing id, missing title, wrong field types) are
//! skipped with a warning so one bad record does not spoil the whole sitemap.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::markup::Link;
use crate::domain::{
    CategoryRecord, ForestBuilder, Hierarchical, PageRecord, PostRecord, PostStatus, SortKey,
    SortOrder, TreeNode, ROOT_PARENT_ID,
};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{ContentSource, PageQuery, PostQuery};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSnapshot {
    site: RawSite,
    categories: Vec<Value>,
    posts: Vec<Value>,
    pages: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSite {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    id: Option<u64>,
    name: Option<String>,
    #[serde(default)]
    parent: u64,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<u64>,
    title: Option<String>,
    #[serde(default)]
    parent: u64,
    #[serde(default)]
    categories: Vec<u64>,
    status: Option<String>,
    date: Option<String>,
    slug: Option<String>,
    #[serde(default)]
    menu_order: i64,
    link: Option<String>,
}

/// Fields used for ordering, shared by posts and pages.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SortFields {
    id: u64,
    title: String,
    date: Option<NaiveDateTime>,
    slug: String,
    menu_order: i64,
}

impl SortFields {
    fn compare(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Title => self.title.to_lowercase().cmp(&other.title.to_lowercase()),
            // Undated entries sort after dated ones
            SortKey::Date => match (self.date, other.date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Id => self.id.cmp(&other.id),
            SortKey::MenuOrder => self.menu_order.cmp(&other.menu_order),
            SortKey::Slug => self.slug.cmp(&other.slug),
        }
    }
}

#[derive(Debug, Clone)]
struct SnapshotPost {
    record: PostRecord,
    categories: Vec<u64>,
    sort: SortFields,
}

#[derive(Debug, Clone)]
struct SnapshotPage {
    page: PageRecord,
    parent_id: u64,
    link: String,
    status: PostStatus,
    sort: SortFields,
}

impl Hierarchical for SnapshotPage {
    fn node_id(&self) -> u64 {
        self.page.id
    }

    fn parent_id(&self) -> u64 {
        self.parent_id
    }
}

/// In-memory content store loaded from a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    base_url: String,
    categories: Vec<CategoryRecord>,
    posts: Vec<SnapshotPost>,
    pages: Vec<SnapshotPage>,
}

impl SnapshotSource {
    /// Load a snapshot file.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> InfraResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read snapshot {}", path.display()), e))?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse snapshot JSON held in memory.
    pub fn from_json(content: &str) -> InfraResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> InfraResult<Self> {
        let raw: RawSnapshot =
            serde_json::from_str(content).map_err(|e| InfraError::Snapshot {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        let mut source = Self {
            base_url: raw.site.base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        };

        for raw_cat in decode_entries::<RawCategory>(raw.categories, "category") {
            let (Some(id), Some(name)) = (raw_cat.id, raw_cat.name) else {
                warn!("skipping category without id or name");
                continue;
            };
            let link = raw_cat
                .link
                .unwrap_or_else(|| source.category_permalink(id));
            source.categories.push(CategoryRecord {
                id,
                name,
                parent_id: raw_cat.parent,
                link,
            });
        }

        for entry in decode_entries::<RawEntry>(raw.posts, "post") {
            let Some((id, title, status)) = required_fields(&entry, "post") else {
                continue;
            };
            let permalink = entry
                .link
                .clone()
                .unwrap_or_else(|| source.post_permalink(id));
            source.posts.push(SnapshotPost {
                record: PostRecord {
                    id,
                    title: title.clone(),
                    permalink,
                    primary_category_id: entry.categories.first().copied(),
                    status,
                },
                categories: entry.categories.clone(),
                sort: sort_fields(id, title, &entry),
            });
        }

        for entry in decode_entries::<RawEntry>(raw.pages, "page") {
            let Some((id, title, status)) = required_fields(&entry, "page") else {
                continue;
            };
            let link = entry
                .link
                .clone()
                .unwrap_or_else(|| source.page_permalink(id));
            source.pages.push(SnapshotPage {
                page: PageRecord {
                    id,
                    title: title.clone(),
                },
                parent_id: entry.parent,
                link,
                status,
                sort: sort_fields(id, title, &entry),
            });
        }

        debug!(
            categories = source.categories.len(),
            posts = source.posts.len(),
            pages = source.pages.len(),
            "snapshot loaded from {origin}"
        );
        Ok(source)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn category_permalink(&self, id: u64) -> String {
        format!("{}/?cat={id}", self.base_url)
    }

    pub fn post_permalink(&self, id: u64) -> String {
        format!("{}/?p={id}", self.base_url)
    }

    pub fn page_permalink(&self, id: u64) -> String {
        format!("{}/?page_id={id}", self.base_url)
    }
}

impl ContentSource for SnapshotSource {
    fn fetch_categories(&self, exclude_ids: &BTreeSet<u64>) -> Vec<CategoryRecord> {
        self.categories
            .iter()
            .filter(|c| !exclude_ids.contains(&c.id))
            .cloned()
            .collect()
    }

    fn fetch_posts(&self, query: &PostQuery) -> Vec<PostRecord> {
        let matching = self.posts.iter().filter(|p| {
            p.categories.contains(&query.category_id)
                && !query.exclude_ids.contains(&p.record.id)
                && is_listed(p.record.status, query.include_password_protected)
        });

        sort_by_key_and_order(matching, |p| &p.sort, query.sort_key, query.sort_order)
            .map(|p| p.record.clone())
            .collect()
    }

    fn fetch_flat_page_list(&self, query: &PageQuery) -> String {
        let listed = self.pages.iter().filter(|p| {
            !query.exclude_ids.contains(&p.page.id)
                && is_listed(p.status, query.include_password_protected)
        });
        let pages: Vec<SnapshotPage> =
            sort_by_key_and_order(listed, |p| &p.sort, query.sort_key, query.sort_order)
                .cloned()
                .collect();

        let builder = ForestBuilder::new()
            .with_root(ROOT_PARENT_ID)
            .with_max_depth(query.max_depth);
        let forest = match builder.build(&pages) {
            Ok(forest) => forest,
            Err(e) => {
                warn!("page hierarchy unusable ({e}), listing pages flat");
                pages.into_iter().map(TreeNode::new).collect()
            }
        };

        let mut html = String::new();
        render_page_items(&forest, &mut html);
        html
    }
}

/// Decode each entry on its own, dropping the ones that do not fit `T`.
fn decode_entries<T: DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping malformed {kind} #{idx}: {e}");
                None
            }
        })
        .collect()
}

/// Id, title and listable status of a post or page entry.
fn required_fields(entry: &RawEntry, kind: &str) -> Option<(u64, String, PostStatus)> {
    let (Some(id), Some(title)) = (entry.id, entry.title.clone()) else {
        warn!("skipping {kind} without id or title");
        return None;
    };
    let status = match entry.status.as_deref().unwrap_or("publish") {
        "publish" | "public" => PostStatus::Public,
        "password" | "password_protected" => PostStatus::PasswordProtected,
        other => {
            debug!(id, "skipping {kind} with unlisted status '{other}'");
            return None;
        }
    };
    Some((id, title, status))
}

fn sort_fields(id: u64, title: String, entry: &RawEntry) -> SortFields {
    SortFields {
        id,
        title,
        date: entry.date.as_deref().and_then(|d| parse_date(id, d)),
        slug: entry.slug.clone().unwrap_or_default(),
        menu_order: entry.menu_order,
    }
}

/// Accepts `2024-03-01T10:00:00`, RFC 3339 (`...Z`, `...+02:00`) and `2024-03-01`.
///
/// Offsets are normalized to UTC. Unreadable dates only lose their sort
/// position, the entry itself is kept.
fn parse_date(id: u64, raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    if parsed.is_none() {
        warn!(id, "ignoring unreadable date '{raw}'");
    }
    parsed
}

fn is_listed(status: PostStatus, include_password_protected: bool) -> bool {
    match status {
        PostStatus::Public => true,
        PostStatus::PasswordProtected => include_password_protected,
    }
}

/// Stable sort; source order is kept when no key is given.
fn sort_by_key_and_order<'a, T, I, F>(
    items: I,
    fields: F,
    key: Option<SortKey>,
    order: Option<SortOrder>,
) -> impl Iterator<Item = &'a T>
where
    T: 'a,
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> &SortFields,
{
    let items: Vec<&T> = items.collect();
    let Some(key) = key else {
        return items.into_iter();
    };
    let order = order.unwrap_or_default();
    items
        .into_iter()
        .sorted_by(|a, b| {
            let ord = fields(a).compare(fields(b), key);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
}

fn render_page_items(nodes: &[TreeNode<SnapshotPage>], html: &mut String) {
    for node in nodes {
        let page = &node.record;
        html.push_str(&format!(
            r#"<li class="page_item page-item-{}">"#,
            page.page.id
        ));
        html.push_str(&Link::new(&page.link, &page.page.title).to_string());
        if !node.children.is_empty() {
            html.push_str(r#"<ul class="children">"#);
            render_page_items(&node.children, html);
            html.push_str("</ul>");
        }
        html.push_str("</li>");
    }
}
