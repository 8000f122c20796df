//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sitemap-tree/sitemap-tree.toml`
//! 3. Local config: `<dir>/.sitemap-tree.toml`
//! 4. Environment variables: `SITEMAP_*` prefix

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::SitemapRequest;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt, TomlResultExt};
use crate::domain::{Labels, RenderOptions, SortKey, SortOrder, DEFAULT_MAX_DEPTH, ROOT_PARENT_ID};

const APP_NAME: &str = "sitemap-tree";
const LOCAL_CONFIG_FILE: &str = ".sitemap-tree.toml";
const ENV_PREFIX: &str = "SITEMAP";

/// What goes into the sitemap and how it looks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SitemapConfig {
    pub map_pages: bool,
    pub map_posts: bool,
    pub add_nofollow: bool,
    pub include_password_protected: bool,
    /// Page and post ids left out of every list
    pub exclude_pages: Vec<u64>,
    /// Category ids removed before the tree is built
    pub exclude_categories: Vec<u64>,
    pub display_category_label: bool,
    pub category_label_separator: String,
    pub display_titles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<SortKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            map_pages: true,
            map_posts: true,
            add_nofollow: false,
            include_password_protected: false,
            exclude_pages: vec![],
            exclude_categories: vec![],
            display_category_label: true,
            category_label_separator: ": ".into(),
            display_titles: true,
            sort_key: None,
            sort_order: None,
        }
    }
}

/// One entry of an exclusion list in a config file.
///
/// Plain integers add an id; `"!id"` removes an inherited one.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdEntry {
    Id(u64),
    Pattern(String),
}

/// Raw sitemap section (every field optional to detect "not specified").
///
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty list
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSitemapConfig {
    pub map_pages: Option<bool>,
    pub map_posts: Option<bool>,
    pub add_nofollow: Option<bool>,
    pub include_password_protected: Option<bool>,
    pub exclude_pages: Option<Vec<IdEntry>>,
    pub exclude_categories: Option<Vec<IdEntry>>,
    pub display_category_label: Option<bool>,
    pub category_label_separator: Option<String>,
    pub display_titles: Option<bool>,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLabels {
    pub pages_title: Option<String>,
    pub posts_title: Option<String>,
    pub category: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub snapshot: Option<PathBuf>,
    pub root_parent_id: Option<u64>,
    pub max_depth: Option<usize>,
    pub sitemap: RawSitemapConfig,
    pub labels: RawLabels,
}

impl SitemapConfig {
    /// Merge id lists with union semantics and negation support.
    ///
    /// ```ignore
    /// merge_ids(&[1, 2], &[Id(3)])               // → [1, 2, 3]
    /// merge_ids(&[1, 2], &[Pattern("!1"), Id(3)]) // → [2, 3]
    /// ```
    pub fn merge_ids(base: &[u64], overlay: &[IdEntry]) -> ApplicationResult<Vec<u64>> {
        let mut result: BTreeSet<u64> = base.iter().copied().collect();

        for entry in overlay {
            match entry {
                IdEntry::Id(id) => {
                    result.insert(*id);
                }
                IdEntry::Pattern(pattern) => {
                    let (negated, digits) = match pattern.trim().strip_prefix('!') {
                        Some(rest) => (true, rest.trim()),
                        None => (false, pattern.trim()),
                    };
                    let id: u64 = digits.parse().map_err(|_| ApplicationError::Config {
                        message: format!("invalid id '{pattern}' in exclusion list"),
                    })?;
                    if negated {
                        result.remove(&id);
                    } else {
                        result.insert(id);
                    }
                }
            }
        }

        Ok(result.into_iter().collect())
    }

    /// Merge overlay onto self: scalars replace when given, id lists union.
    pub fn merge(&self, overlay: &RawSitemapConfig) -> ApplicationResult<Self> {
        let exclude_pages = match &overlay.exclude_pages {
            Some(o) => Self::merge_ids(&self.exclude_pages, o)?,
            None => self.exclude_pages.clone(),
        };
        let exclude_categories = match &overlay.exclude_categories {
            Some(o) => Self::merge_ids(&self.exclude_categories, o)?,
            None => self.exclude_categories.clone(),
        };
        Ok(self.with_scalars(overlay, exclude_pages, exclude_categories))
    }

    /// Apply global config onto defaults: id lists given here REPLACE the base.
    pub fn apply_global(&self, global: &RawSitemapConfig) -> ApplicationResult<Self> {
        let exclude_pages = match &global.exclude_pages {
            Some(g) => Self::merge_ids(&[], g)?,
            None => self.exclude_pages.clone(),
        };
        let exclude_categories = match &global.exclude_categories {
            Some(g) => Self::merge_ids(&[], g)?,
            None => self.exclude_categories.clone(),
        };
        Ok(self.with_scalars(global, exclude_pages, exclude_categories))
    }

    fn with_scalars(
        &self,
        raw: &RawSitemapConfig,
        exclude_pages: Vec<u64>,
        exclude_categories: Vec<u64>,
    ) -> Self {
        Self {
            map_pages: raw.map_pages.unwrap_or(self.map_pages),
            map_posts: raw.map_posts.unwrap_or(self.map_posts),
            add_nofollow: raw.add_nofollow.unwrap_or(self.add_nofollow),
            include_password_protected: raw
                .include_password_protected
                .unwrap_or(self.include_password_protected),
            exclude_pages,
            exclude_categories,
            display_category_label: raw
                .display_category_label
                .unwrap_or(self.display_category_label),
            category_label_separator: raw
                .category_label_separator
                .clone()
                .unwrap_or_else(|| self.category_label_separator.clone()),
            display_titles: raw.display_titles.unwrap_or(self.display_titles),
            sort_key: raw.sort_key.or(self.sort_key),
            sort_order: raw.sort_order.or(self.sort_order),
        }
    }
}

fn merge_labels(base: &Labels, raw: &RawLabels) -> Labels {
    Labels {
        pages_title: raw
            .pages_title
            .clone()
            .unwrap_or_else(|| base.pages_title.clone()),
        posts_title: raw
            .posts_title
            .clone()
            .unwrap_or_else(|| base.posts_title.clone()),
        category: raw.category.clone().unwrap_or_else(|| base.category.clone()),
    }
}

/// Unified configuration for sitemap-tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Snapshot file read by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
    /// Parent id whose children become the top-level categories
    pub root_parent_id: u64,
    pub max_depth: usize,
    pub sitemap: SitemapConfig,
    pub labels: Labels,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot: None,
            root_parent_id: ROOT_PARENT_ID,
            max_depth: DEFAULT_MAX_DEPTH,
            sitemap: SitemapConfig::default(),
            labels: Labels::default(),
        }
    }
}

/// Get the XDG config directory for sitemap-tree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).with_path_context("read", path)?;
    toml::from_str(&content).config_context(path)
}

/// `SITEMAP_*` variables, e.g. `SITEMAP_MAX_DEPTH`, `SITEMAP_SITEMAP__ADD_NOFOLLOW`.
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("sitemap.exclude_pages")
        .with_list_parse_key("sitemap.exclude_categories")
        .try_parsing(true)
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `"!id"` negation
    /// - Any → Env vars: REPLACE
    pub fn load(local_dir: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers(global_config_path().as_deref(), local_dir, env_source())
    }

    /// Layered load with every source given explicitly.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Environment,
    ) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_path.filter(|p| p.exists()) {
            debug!("global config: {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.apply_global(&raw)?;
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw)?;
            }
        }

        current = current.apply_env_overrides(env)?;
        current.expand_paths()?;

        Ok(current)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the snapshot path.
    fn expand_paths(&mut self) -> ApplicationResult<()> {
        if let Some(snapshot) = &self.snapshot {
            let raw = snapshot.to_string_lossy();
            let expanded = shellexpand::full(&raw).map_err(|e| ApplicationError::Config {
                message: format!("expand snapshot path: {e}"),
            })?;
            self.snapshot = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }

    fn merge_with(&self, overlay: &RawSettings) -> ApplicationResult<Self> {
        Ok(Self {
            snapshot: overlay.snapshot.clone().or_else(|| self.snapshot.clone()),
            root_parent_id: overlay.root_parent_id.unwrap_or(self.root_parent_id),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            sitemap: self.sitemap.merge(&overlay.sitemap)?,
            labels: merge_labels(&self.labels, &overlay.labels),
        })
    }

    fn apply_global(&self, global: &RawSettings) -> ApplicationResult<Self> {
        Ok(Self {
            snapshot: global.snapshot.clone().or_else(|| self.snapshot.clone()),
            root_parent_id: global.root_parent_id.unwrap_or(self.root_parent_id),
            max_depth: global.max_depth.unwrap_or(self.max_depth),
            sitemap: self.sitemap.apply_global(&global.sitemap)?,
            labels: merge_labels(&self.labels, &global.labels),
        })
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> ApplicationResult<Self> {
        let config = Config::builder().add_source(env).build().map_err(config_err)?;

        if let Ok(val) = config.get_string("snapshot") {
            self.snapshot = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get::<u64>("root_parent_id") {
            self.root_parent_id = val;
        }
        if let Ok(val) = config.get::<usize>("max_depth") {
            self.max_depth = val;
        }

        let s = &mut self.sitemap;
        for (key, field) in [
            ("sitemap.map_pages", &mut s.map_pages),
            ("sitemap.map_posts", &mut s.map_posts),
            ("sitemap.add_nofollow", &mut s.add_nofollow),
            ("sitemap.include_password_protected", &mut s.include_password_protected),
            ("sitemap.display_category_label", &mut s.display_category_label),
            ("sitemap.display_titles", &mut s.display_titles),
        ] {
            if let Ok(val) = config.get_bool(key) {
                *field = val;
            }
        }
        if let Some(val) = get_id_list(&config, "sitemap.exclude_pages") {
            s.exclude_pages = val;
        }
        if let Some(val) = get_id_list(&config, "sitemap.exclude_categories") {
            s.exclude_categories = val;
        }
        if let Ok(val) = config.get_string("sitemap.category_label_separator") {
            s.category_label_separator = val;
        }
        if let Ok(val) = config.get_string("sitemap.sort_key") {
            s.sort_key = Some(val.parse().map_err(|message| ApplicationError::Config { message })?);
        }
        if let Ok(val) = config.get_string("sitemap.sort_order") {
            s.sort_order = Some(val.parse().map_err(|message| ApplicationError::Config { message })?);
        }

        let l = &mut self.labels;
        for (key, field) in [
            ("labels.pages_title", &mut l.pages_title),
            ("labels.posts_title", &mut l.posts_title),
            ("labels.category", &mut l.category),
        ] {
            if let Ok(val) = config.get_string(key) {
                *field = val;
            }
        }

        Ok(self)
    }

    /// Display options derived from the `[sitemap]` section.
    pub fn render_options(&self) -> RenderOptions {
        let s = &self.sitemap;
        RenderOptions {
            add_nofollow: s.add_nofollow,
            include_password_protected: s.include_password_protected,
            exclude_page_ids: s.exclude_pages.iter().copied().collect(),
            exclude_category_ids: s.exclude_categories.iter().copied().collect(),
            display_category_label: s.display_category_label,
            category_label_separator: s.category_label_separator.clone(),
            sort_key: s.sort_key,
            sort_order: s.sort_order,
        }
    }

    /// Full render request for these settings.
    pub fn request(&self) -> SitemapRequest {
        SitemapRequest {
            map_pages: self.sitemap.map_pages,
            map_posts: self.sitemap.map_posts,
            display_titles: self.sitemap.display_titles,
            root_parent_id: self.root_parent_id,
            max_depth: self.max_depth,
            options: self.render_options(),
            labels: self.labels.clone(),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sitemap-tree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sitemap-tree/sitemap-tree.toml  (your baseline)
#   Local:  <dir>/.sitemap-tree.toml                  (site-specific additions)
#   Env:    SITEMAP_* environment variables           (explicit overrides)
#           e.g. SITEMAP_MAX_DEPTH=8, SITEMAP_SITEMAP__ADD_NOFOLLOW=true
#
# Exclusion lists:
#   Global config REPLACES the compiled defaults.
#   Local config UNIONS with global. Use "!id" to REMOVE an inherited id:
#     exclude_categories = [12, "!7"]  # adds 12, re-includes 7

# Snapshot file to read when --snapshot is not given
# snapshot = "~/sites/example/snapshot.json"

# Categories whose parent is this id become the top of the tree
# root_parent_id = 0

# Nesting limit for category and page trees
# max_depth = 64

[sitemap]
# map_pages = true
# map_posts = true
# add_nofollow = false
# include_password_protected = false
# exclude_pages = []
# exclude_categories = []
# display_category_label = true
# category_label_separator = ": "
# display_titles = true
# sort_key = "title"    # title | date | id | menu_order | slug
# sort_order = "asc"    # asc | desc

[labels]
# pages_title = "Pages"
# posts_title = "Posts"
# category = "Category"
"#
        .to_string()
    }
}

/// Comma-separated ids; a single id parses as a number, not a list.
fn get_id_list(config: &Config, key: &str) -> Option<Vec<u64>> {
    config
        .get::<Vec<u64>>(key)
        .or_else(|_| config.get::<u64>(key).map(|id| vec![id]))
        .ok()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    fn ids(entries: &[&str]) -> Vec<IdEntry> {
        entries
            .iter()
            .map(|e| match e.parse::<u64>() {
                Ok(id) => IdEntry::Id(id),
                Err(_) => IdEntry::Pattern(e.to_string()),
            })
            .collect()
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.request(), SitemapRequest::default());
    }

    #[rstest]
    #[case(&[1, 2], &["3"], vec![1, 2, 3])]
    #[case(&[1, 2], &["!1", "3"], vec![2, 3])]
    #[case(&[1, 2], &["!9"], vec![1, 2])]
    #[case(&[], &["4"], vec![4])]
    #[case(&[4], &[], vec![4])]
    #[case(&[1, 2], &["2", "1"], vec![1, 2])]
    #[case(&[5], &[" ! 5 "], vec![])]
    fn given_id_lists_when_merging_then_union_with_negation(
        #[case] base: &[u64],
        #[case] overlay: &[&str],
        #[case] want: Vec<u64>,
    ) {
        assert_eq!(SitemapConfig::merge_ids(base, &ids(overlay)).unwrap(), want);
    }

    #[test]
    fn given_garbage_id_when_merging_then_config_error() {
        let err = SitemapConfig::merge_ids(&[], &ids(&["!abc"])).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_global_lists_when_applying_then_replaces_base() {
        let base = SitemapConfig {
            exclude_categories: vec![1, 2],
            ..SitemapConfig::default()
        };
        let global = RawSitemapConfig {
            exclude_categories: Some(ids(&["7"])),
            add_nofollow: Some(true),
            ..RawSitemapConfig::default()
        };

        let result = base.apply_global(&global).unwrap();

        assert_eq!(result.exclude_categories, vec![7]);
        assert!(result.add_nofollow);
        assert!(result.exclude_pages.is_empty());
    }

    #[test]
    fn given_local_overlay_when_merging_then_scalars_replace_lists_union() {
        let base = SitemapConfig {
            exclude_pages: vec![3, 4],
            sort_key: Some(SortKey::Title),
            ..SitemapConfig::default()
        };
        let overlay = RawSitemapConfig {
            exclude_pages: Some(ids(&["!3", "9"])),
            sort_order: Some(SortOrder::Desc),
            display_titles: Some(false),
            ..RawSitemapConfig::default()
        };

        let result = base.merge(&overlay).unwrap();

        assert_eq!(result.exclude_pages, vec![4, 9]);
        assert_eq!(result.sort_key, Some(SortKey::Title));
        assert_eq!(result.sort_order, Some(SortOrder::Desc));
        assert!(!result.display_titles);
        assert!(result.map_pages);
    }

    #[test]
    fn given_env_vars_when_loading_then_they_override() {
        let settings = Settings::load_layers(
            None,
            None,
            env(&[
                ("SITEMAP_MAX_DEPTH", "8"),
                ("SITEMAP_ROOT_PARENT_ID", "3"),
                ("SITEMAP_SITEMAP__ADD_NOFOLLOW", "true"),
                ("SITEMAP_SITEMAP__EXCLUDE_CATEGORIES", "4,5"),
                ("SITEMAP_SITEMAP__EXCLUDE_PAGES", "11"),
                ("SITEMAP_SITEMAP__SORT_KEY", "menu-order"),
                ("SITEMAP_LABELS__POSTS_TITLE", "Articles"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.root_parent_id, 3);
        assert!(settings.sitemap.add_nofollow);
        assert_eq!(settings.sitemap.exclude_categories, vec![4, 5]);
        assert_eq!(settings.sitemap.exclude_pages, vec![11]);
        assert_eq!(settings.sitemap.sort_key, Some(SortKey::MenuOrder));
        assert_eq!(settings.labels.posts_title, "Articles");
    }

    #[test]
    fn given_bad_sort_key_in_env_when_loading_then_config_error() {
        let err = Settings::load_layers(None, None, env(&[("SITEMAP_SITEMAP__SORT_KEY", "random")]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_tilde_in_snapshot_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            snapshot: Some(PathBuf::from("~/site.json")),
            ..Settings::default()
        };

        settings.expand_paths().unwrap();

        let home = std::env::var("HOME").expect("HOME should be set");
        let snapshot = settings.snapshot.unwrap();
        assert!(snapshot.starts_with(&home), "not expanded: {}", snapshot.display());
    }

    #[test]
    fn given_settings_when_converting_then_request_carries_everything() {
        let settings = Settings {
            root_parent_id: 2,
            max_depth: 5,
            sitemap: SitemapConfig {
                map_pages: false,
                exclude_pages: vec![8],
                exclude_categories: vec![9],
                category_label_separator: " / ".into(),
                ..SitemapConfig::default()
            },
            ..Settings::default()
        };

        let request = settings.request();

        assert!(!request.map_pages);
        assert_eq!(request.root_parent_id, 2);
        assert_eq!(request.max_depth, 5);
        assert_eq!(request.options.exclude_page_ids, BTreeSet::from([8]));
        assert_eq!(request.options.exclude_category_ids, BTreeSet::from([9]));
        assert_eq!(request.options.category_label_separator, " / ");
    }

    #[test]
    fn given_settings_when_serialized_then_template_keys_parse_back() {
        let toml = Settings::default().to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, Settings::default());

        let template: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(template.snapshot.is_none());
    }
}
