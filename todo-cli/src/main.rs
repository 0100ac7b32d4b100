//! # todo
//!
//! Local-first todo list whose replicas sync through a shared change log.
//!
//! ## Commands
//!
//! - `init`: Create the todo files in the data directory
//! - `add`: Add a todo
//! - `list`: Show pending todos
//! - `done`, `archive`, `delete`: Edit todos by id
//! - `sync`: Exchange changes with the shared change log
//!
//! ## Example
//!
//! ```bash
//! todo init
//! todo add Buy milk +home @shop pri:H due:2024-05-01
//! todo list
//! todo done 1
//!
//! # With [sync] filepath set in todo.toml
//! todo sync --verbose
//! ```
//!
//! Set `RUST_LOG=todosync_client=debug` to trace a sync.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod report;

use commands::{add, edit, init, list, sync, Workspace};
use config::{Config, CONFIG_FILE};

/// Local-first todo list with change-log sync.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding the todo files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: todo.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the todo files
    Init,

    /// Add a todo (+project, @context, pri:X and due:DATE are recognised)
    Add {
        /// Subject words
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Show pending todos
    List,

    /// Mark todos done
    Done {
        /// Todo ids
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Move todos to the archive
    Archive {
        /// Todo ids
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Delete todos
    Delete {
        /// Todo ids
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Sync with the shared change log
    Sync {
        /// Also list the added, modified and deleted todos
        #[arg(long, short)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_file_or_default(&data_dir.join(CONFIG_FILE))?,
    };
    tracing::debug!(data_dir = %data_dir.display(), ?config, "loaded configuration");

    let ws = Workspace::new(data_dir, config);
    match cli.command {
        Commands::Init => init::run(&ws).await?,
        Commands::Add { words } => {
            add::run(&ws, &words).await?;
        }
        Commands::List => list::run(&ws).await?,
        Commands::Done { ids } => edit::run(&ws, edit::Edit::Complete, &ids).await?,
        Commands::Archive { ids } => edit::run(&ws, edit::Edit::Archive, &ids).await?,
        Commands::Delete { ids } => edit::run(&ws, edit::Edit::Delete, &ids).await?,
        Commands::Sync { verbose } => {
            sync::run(&ws, verbose).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for todo.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "todosync", "todo")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
