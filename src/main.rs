use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dualpane::cli::{
    open_settings, run_columns, run_delete, run_download, run_list, run_status, run_tree,
    ColumnsOptions, ListOptions, Session,
};
use dualpane::columns::ViewContext;
use dualpane::config::GalleryConfig;
use dualpane::logging::{init_logging, LOG_ENV};
use dualpane::model::{DirectoryNode, MediaFilter, MediaId, Pane};
use dualpane::tui::run_tui;

#[derive(Parser)]
#[command(name = "dualpane")]
#[command(about = "Dual-pane browser for a remote media library")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Media server base URL (overrides the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings database for column counts (default: platform data dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse both panes interactively (default)
    Browse,
    /// Print a pane's directory tree
    Tree {
        #[arg(long, default_value = "source")]
        pane: Pane,
    },
    /// List media ids of a directory
    List {
        #[arg(long, default_value = "source")]
        pane: Pane,
        /// Directory id as shown by `tree`
        #[arg(long)]
        directory: String,
        /// all, unique, duplicates, exclusive or common
        #[arg(long, default_value = "all")]
        filter: MediaFilter,
        /// Fetch and print details for every item
        #[arg(long)]
        details: bool,
    },
    /// Show or change persisted column counts
    Columns {
        #[arg(long)]
        pane: Option<Pane>,
        /// desktop-split, desktop-single, mobile-split or mobile-single
        #[arg(long)]
        context: Option<ViewContext>,
        /// New column count (clamped to the context's bounds)
        #[arg(long)]
        set: Option<u32>,
    },
    /// Delete media on the server
    Delete {
        #[arg(long, default_value = "source")]
        pane: Pane,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Download one media item
    Download {
        #[arg(long, default_value = "source")]
        pane: Pane,
        id: String,
        /// Output file (default: the item's file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show media server status
    Status,
}

fn main() -> Result<()> {
    // Guard must be held for logs to flush
    let _guard = init_logging().ok();
    let verbose = std::env::var(LOG_ENV).is_ok();
    let start = Instant::now();

    let cli = Cli::parse();

    let result = run_command(cli);

    if verbose {
        eprintln!("Completed in {:.2?}", start.elapsed());
    }

    result
}

fn load_config(cli: &Cli) -> Result<GalleryConfig> {
    let mut config = GalleryConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn run_command(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Tree { pane }) => {
            let session = Session::new(config)?;
            let tree = run_tree(&session, pane)?;
            for (depth, node) in DirectoryNode::flatten(&tree) {
                println!("{}{}  [{}]", "  ".repeat(depth), node.name, node.id);
            }
        }
        Some(Commands::List {
            pane,
            directory,
            filter,
            details,
        }) => {
            let session = Session::new(config)?;
            let options = ListOptions {
                pane,
                directory,
                filter,
                details,
            };
            let items = run_list(&session, options)?;
            for item in &items {
                match &item.detail {
                    Some(detail) => println!(
                        "{}\t{}\t{}\t{}",
                        item.id,
                        detail.label(),
                        detail.created_at.as_deref().unwrap_or("-"),
                        detail.size.as_deref().unwrap_or("-"),
                    ),
                    None => println!("{}", item.id),
                }
            }
            println!("{} items", items.len());
        }
        Some(Commands::Columns { pane, context, set }) => {
            let store = open_settings(cli.settings.as_deref())?;
            let rows = run_columns(store, ColumnsOptions { pane, context, set })?;
            for row in rows {
                println!(
                    "{:<12} {:<15} {:>2}  ({}-{})",
                    row.pane.to_string(),
                    row.context.to_string(),
                    row.count,
                    row.bounds.0,
                    row.bounds.1
                );
            }
        }
        Some(Commands::Delete { pane, ids }) => {
            let session = Session::new(config)?;
            let ids: Vec<MediaId> = ids.into_iter().map(MediaId::from).collect();
            let outcome = run_delete(&session, pane, &ids)?;
            if outcome.message.is_empty() {
                println!("Deleted {} items", ids.len());
            } else {
                println!("Deleted {} items: {}", ids.len(), outcome.message);
            }
        }
        Some(Commands::Download { pane, id, output }) => {
            let session = Session::new(config)?;
            let summary = run_download(&session, pane, &MediaId::from(id), output.as_deref())?;
            println!("Saved {} ({} bytes)", summary.path.display(), summary.bytes);
        }
        Some(Commands::Status) => {
            let session = Session::new(config)?;
            let status = run_status(&session)?;
            println!("Server: {}", session.backend.base_url());
            println!("  Accessible: {}", if status.is_accessible { "yes" } else { "no" });
            if let Some(running) = status.is_running {
                println!("  Running: {}", if running { "yes" } else { "no" });
            }
            println!(
                "  Source: {} ({} files)",
                status.source_directory, status.source_file_count
            );
            println!(
                "  Destination: {} ({} files)",
                status.destination_directory, status.destination_file_count
            );
            if let Some(last) = &status.last_execution_date {
                println!("  Last run: {}", last);
            }
        }
        Some(Commands::Browse) | None => {
            let session = Session::new(config)?;
            let store = open_settings(cli.settings.as_deref())?;
            run_tui(session, store)?;
        }
    }

    Ok(())
}
