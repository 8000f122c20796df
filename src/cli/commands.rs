//! Command dispatch and handlers

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SitemapRequest;
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands, RenderArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{forest_depth, forest_size};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Render(args)) => cmd_render(cli, args),
        Some(Commands::Tree) => cmd_tree(cli),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `sitemap-tree --help`".into(),
        )),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    Ok(Settings::load(Some(dir.as_path()))?)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::new(settings, cli.snapshot.as_deref())?)
}

/// Overlay the render flags given on the command line onto `request`.
pub fn apply_render_args(mut request: SitemapRequest, args: &RenderArgs) -> SitemapRequest {
    if args.pages || args.posts {
        request.map_pages = args.pages;
        request.map_posts = args.posts;
    }
    let options = &mut request.options;
    options.add_nofollow |= args.nofollow;
    options.include_password_protected |= args.include_protected;
    options.exclude_page_ids.extend(&args.exclude_pages);
    options.exclude_category_ids.extend(&args.exclude_categories);
    if args.sort.is_some() {
        options.sort_key = args.sort;
    }
    if args.order.is_some() {
        options.sort_order = args.order;
    }
    if args.no_label {
        options.display_category_label = false;
    }
    if args.no_titles {
        request.display_titles = false;
    }
    request
}

#[instrument(level = "debug", skip_all)]
fn cmd_render(cli: &Cli, args: &RenderArgs) -> CliResult<()> {
    let container = container(cli)?;
    let request = apply_render_args(container.settings.request(), args);
    debug!(?request);

    let html = container.sitemap.render(&request)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{html}\n")).with_path_context("write sitemap", path)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&html),
    }
    Ok(())
}

#[instrument(level = "debug", skip_all)]
fn cmd_tree(cli: &Cli) -> CliResult<()> {
    let container = container(cli)?;
    let result = container.sitemap.category_forest(&container.settings.request())?;

    for root in &result.forest {
        output::info(&root.to_termtree());
    }
    output::header(&format!(
        "{} categories, depth {}",
        forest_size(&result.forest),
        forest_depth(&result.forest)
    ));
    if !result.orphans.is_empty() {
        let names: Vec<String> = result.orphans.iter().map(ToString::to_string).collect();
        output::warning(&format!(
            "{} categories not reachable from root {}: {}",
            names.len(),
            container.settings.root_parent_id,
            names.join(", ")
        ));
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match global_config_path() {
                Some(path) => print_path_status("global", &path),
                None => output::failure("global: no config directory on this platform"),
            }
            print_path_status("local", &local_config_path(&config_dir(cli)?));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory on this platform".into())
                })?
            } else {
                local_config_path(&config_dir(cli)?)
            };
            init_config(&path)?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}

fn print_path_status(label: &str, path: &Path) {
    if path.exists() {
        output::success_detail(&format!("{label}: {}", path.display()));
    } else {
        output::failure(&format!("{label}: {} (not found)", path.display()));
    }
}

fn init_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::InvalidArgs(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path_context("create directory", parent)?;
    }
    fs::write(path, Settings::template()).with_path_context("write config", path)?;
    Ok(())
}
