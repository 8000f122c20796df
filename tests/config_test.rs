//! Integration tests for Settings config loading with layered merge semantics.
//!
//! - Defaults → Global: REPLACE
//! - Global → Local: UNION with `"!id"` negation
//! - Any → Env vars: REPLACE

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use config::Environment;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use sitemap_tree::application::ApplicationError;
use sitemap_tree::config::{local_config_path, Settings};
use sitemap_tree::domain::SortKey;

struct Dirs {
    global: TempDir,
    local: TempDir,
}

impl Dirs {
    fn global_file(&self) -> std::path::PathBuf {
        self.global.path().join("sitemap-tree.toml")
    }

    fn write_global(&self, content: &str) {
        fs::write(self.global_file(), content).unwrap();
    }

    fn write_local(&self, content: &str) {
        fs::write(local_config_path(self.local.path()), content).unwrap();
    }

    fn load(&self, env: &[(&str, &str)]) -> Result<Settings, ApplicationError> {
        Settings::load_layers(
            Some(self.global_file().as_path()),
            Some(self.local.path()),
            env_with(env),
        )
    }
}

fn env_with(vars: &[(&str, &str)]) -> Environment {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::with_prefix("SITEMAP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(Some(map))
}

#[fixture]
fn dirs() -> Dirs {
    Dirs {
        global: TempDir::new().unwrap(),
        local: TempDir::new().unwrap(),
    }
}

#[rstest]
fn given_no_files_when_loading_then_defaults(dirs: Dirs) {
    let settings = dirs.load(&[]).unwrap();
    assert_eq!(settings, Settings::default());
}

#[rstest]
fn given_global_and_local_lists_when_loading_then_local_unions_with_negation(dirs: Dirs) {
    dirs.write_global(
        r#"
[sitemap]
exclude_categories = [1, 2]
add_nofollow = true
"#,
    );
    dirs.write_local(
        r#"
[sitemap]
exclude_categories = ["!1", 5]

[labels]
category = "Topic"
"#,
    );

    let settings = dirs.load(&[]).unwrap();

    assert_eq!(settings.sitemap.exclude_categories, vec![2, 5]);
    assert!(settings.sitemap.add_nofollow);
    assert_eq!(settings.labels.category, "Topic");
    assert_eq!(settings.labels.pages_title, "Pages");
}

#[rstest]
fn given_local_scalars_when_loading_then_they_win_over_global(dirs: Dirs) {
    dirs.write_global("max_depth = 10\nroot_parent_id = 4\n");
    dirs.write_local("max_depth = 3\n[sitemap]\nsort_key = \"date\"\n");

    let settings = dirs.load(&[]).unwrap();

    assert_eq!(settings.max_depth, 3);
    assert_eq!(settings.root_parent_id, 4);
    assert_eq!(settings.sitemap.sort_key, Some(SortKey::Date));
}

#[rstest]
fn given_env_var_when_loading_then_overrides_files(dirs: Dirs) {
    dirs.write_local("max_depth = 3\n[sitemap]\nmap_pages = true\n");

    let settings = dirs
        .load(&[("SITEMAP_MAX_DEPTH", "7"), ("SITEMAP_SITEMAP__MAP_PAGES", "false")])
        .unwrap();

    assert_eq!(settings.max_depth, 7);
    assert!(!settings.sitemap.map_pages);
}

#[rstest]
fn given_snapshot_with_home_var_when_loading_then_expanded(dirs: Dirs) {
    dirs.write_local("snapshot = \"$HOME/site.json\"\n");

    let settings = dirs.load(&[]).unwrap();

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(settings.snapshot, Some(Path::new(&home).join("site.json")));
}

#[rstest]
#[case("max_depth = \"deep\"\n")]
#[case("[sitemap]\nexclude_pages = [\"!x\"]\n")]
#[case("[sitemap\n")]
fn given_invalid_local_config_when_loading_then_config_error(dirs: Dirs, #[case] content: &str) {
    dirs.write_local(content);

    let err = dirs.load(&[]).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }), "got {err:?}");
}

#[rstest]
fn given_effective_settings_when_shown_then_toml_reloads_as_local(dirs: Dirs) {
    dirs.write_global("[sitemap]\nexclude_pages = [9]\n");
    let settings = dirs.load(&[]).unwrap();

    let other = TempDir::new().unwrap();
    fs::write(local_config_path(other.path()), settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load_layers(None, Some(other.path()), env_with(&[])).unwrap();

    assert_eq!(reloaded, settings);
}
