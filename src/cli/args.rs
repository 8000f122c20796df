//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::{SortKey, SortOrder};

/// Render a category/post/page hierarchy into nested HTML sitemap lists
#[derive(Parser, Debug)]
#[command(name = "sitemap-tree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding the local .sitemap-tree.toml (default: cwd)
    #[arg(short = 'c', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Snapshot file (overrides the configured one)
    #[arg(short, long, global = true, env = "SITEMAP_SNAPSHOT", value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the sitemap markup
    Render(RenderArgs),

    /// Show the category hierarchy as a tree
    Tree,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Render flags; each one given overrides the corresponding setting.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Include the page list (with --posts: both, alone: pages only)
    #[arg(long)]
    pub pages: bool,

    /// Include posts grouped by category
    #[arg(long)]
    pub posts: bool,

    /// Mark every link rel="nofollow"
    #[arg(long)]
    pub nofollow: bool,

    /// List password-protected posts and pages too
    #[arg(long)]
    pub include_protected: bool,

    /// Page or post id to leave out (repeatable)
    #[arg(long = "exclude-page", value_name = "ID")]
    pub exclude_pages: Vec<u64>,

    /// Category id to leave out together with its subtree (repeatable)
    #[arg(long = "exclude-category", value_name = "ID")]
    pub exclude_categories: Vec<u64>,

    /// Sort key: title, date, id, menu_order, slug
    #[arg(long, value_name = "KEY")]
    pub sort: Option<SortKey>,

    /// Sort order: asc, desc
    #[arg(long, value_name = "ORDER")]
    pub order: Option<SortOrder>,

    /// Omit the "Category:" prefix on category headers
    #[arg(long)]
    pub no_label: bool,

    /// Omit the "Pages" and "Posts" section titles
    #[arg(long)]
    pub no_titles: bool,

    /// Write markup to FILE instead of stdout
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print config template
    Template,

    /// Create config template file
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },
}
