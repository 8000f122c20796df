//! Domain entities: core data structures

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::tree::{Hierarchical, TreeNode};

/// Parent id marking a top-level record.
pub const ROOT_PARENT_ID: u64 = 0;

/// A post category as delivered by the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
    /// Parent category id, `ROOT_PARENT_ID` for top-level categories
    pub parent_id: u64,
    /// Category archive URL
    pub link: String,
}

impl Hierarchical for CategoryRecord {
    fn node_id(&self) -> u64 {
        self.id
    }

    fn parent_id(&self) -> u64 {
        self.parent_id
    }
}

impl fmt::Display for CategoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.id)
    }
}

/// Category tree node.
pub type CategoryNode = TreeNode<CategoryRecord>;

/// Visibility of a post or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostStatus {
    #[default]
    Public,
    PasswordProtected,
}

/// A post as delivered by the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: u64,
    pub title: String,
    pub permalink: String,
    /// First category assigned to the post; `None` when it has none
    pub primary_category_id: Option<u64>,
    pub status: PostStatus,
}

/// A page; hierarchy and markup are handled by the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: u64,
    pub title: String,
}

/// Field used to order posts and pages when fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Date,
    Id,
    MenuOrder,
    Slug,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "date" => Ok(Self::Date),
            "id" => Ok(Self::Id),
            "menu_order" | "menu-order" => Ok(Self::MenuOrder),
            "slug" | "name" => Ok(Self::Slug),
            other => Err(format!(
                "unknown sort key '{other}' (expected title, date, id, menu_order, slug)"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Id => "id",
            Self::MenuOrder => "menu_order",
            Self::Slug => "slug",
        };
        f.write_str(s)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}' (expected asc, desc)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// User-chosen display options for one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Mark every emitted link `rel="nofollow"`
    pub add_nofollow: bool,
    /// Ask the content source for password-protected content too
    pub include_password_protected: bool,
    /// Ids excluded from page lists and post fetches
    pub exclude_page_ids: BTreeSet<u64>,
    /// Categories removed before the tree is built
    pub exclude_category_ids: BTreeSet<u64>,
    /// Prefix category headers with the category label
    pub display_category_label: bool,
    pub category_label_separator: String,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            add_nofollow: false,
            include_password_protected: false,
            exclude_page_ids: BTreeSet::new(),
            exclude_category_ids: BTreeSet::new(),
            display_category_label: true,
            category_label_separator: ": ".into(),
            sort_key: None,
            sort_order: None,
        }
    }
}

/// Human-readable words emitted into the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub pages_title: String,
    pub posts_title: String,
    /// Word placed before each category header, e.g. "Category"
    pub category: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            pages_title: "Pages".into(),
            posts_title: "Posts".into(),
            category: "Category".into(),
        }
    }
}
