use aniconfig::Config;
use anipreview::{MediaItem, PreviewBuilder, PreviewConfigExt, PreviewMode};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod logging;

use logging::{LoggingOptions, init_logging};

#[derive(Parser)]
#[command(name = "anifzf")]
#[command(author, version, about = "AniFzf - fzf preview scripts backed by a background-filled cache", long_about = None)]
struct Cli {
    /// Log to the console (stderr) at DEBUG level
    #[arg(long, global = true)]
    log: bool,

    /// Log to this file at DEBUG level
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Configuration directory (defaults to $ANIFZF_CONFIG, ./.anifzf, ~/.anifzf)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<String>,

    /// Override the configured preview mode (full, image, text, none)
    #[arg(long, global = true, value_name = "MODE")]
    preview: Option<PreviewMode>,

    /// Write the preview script to this file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Seconds to keep running so the background cache population can finish
    #[arg(long, global = true, default_value_t = 0, value_name = "SECONDS")]
    linger: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the preview for a menu of media items
    Items {
        /// JSON file holding an array of media items
        catalog: PathBuf,

        /// File with one menu line per item (defaults to each item's title)
        #[arg(long, value_name = "FILE")]
        titles: Option<PathBuf>,
    },

    /// Build the preview for a menu of episodes of one media item
    Episodes {
        /// JSON file holding the media item
        item: PathBuf,

        /// Episode identifiers as shown in the menu
        #[arg(required = true)]
        episodes: Vec<String>,
    },
}

fn load_config(dir: Option<&str>) -> Result<Arc<Config>> {
    match dir {
        Some(dir) => Ok(Arc::new(Config::load_config(dir)?)),
        None => Ok(aniconfig::get_config()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn menu_titles(items: &[MediaItem], titles: Option<&Path>) -> Result<Vec<String>> {
    match titles {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(data.lines().map(str::to_string).collect())
        }
        None => Ok(items
            .iter()
            .map(|item| item.title.display().unwrap_or("N/A").to_string())
            .collect()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config_dir.as_deref())?;
    init_logging(
        &config,
        &LoggingOptions {
            console: cli.log,
            file: cli.log_file.clone(),
        },
    )?;

    let mut preview_config = config.get_preview_config()?;
    if let Some(mode) = cli.preview {
        preview_config.mode = mode;
    }
    debug!(?preview_config, "Preview configuration");

    let builder = PreviewBuilder::new(preview_config)?;

    let script = match &cli.command {
        Commands::Items { catalog, titles } => {
            let items: Vec<MediaItem> = read_json(catalog)?;
            let titles = menu_titles(&items, titles.as_deref())?;
            info!(items = items.len(), "Building item preview");
            builder.build_item_preview(&items, &titles)?
        }
        Commands::Episodes { item, episodes } => {
            let item: MediaItem = read_json(item)?;
            info!(episodes = episodes.len(), "Building episode preview");
            builder.build_episode_preview(episodes, &item)?
        }
    };

    match &cli.output {
        Some(path) => std::fs::write(path, &script)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{script}"),
    }

    if cli.linger > 0 {
        debug!(seconds = cli.linger, "Lingering for background cache population");
        tokio::time::sleep(Duration::from_secs(cli.linger)).await;
    }

    Ok(())
}
