//! # setlist CLI
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `setlist list` | List all registered patches |
//! | `setlist info <patch>` | Show a patch's description and expected inputs |
//! | `setlist playlist <patch> [args...]` | Generate a playlist from a patch |
//!
//! ## Examples
//!
//! ```bash
//! # Popular recordings from Germany, drawn from the "easy" third
//! setlist playlist top-country Germany
//!
//! # Same country, hard mode, with resolution progress and a JSON export
//! setlist playlist top-country Germany hard --debug --output ./out/germany.json
//!
//! # Machine-readable progress on stderr
//! setlist playlist top-country Japan medium --progress json
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use setlist::commands;
use setlist::config;
use setlist::patch::PatchRegistry;
use setlist::progress::ProgressMode;
use setlist::source::HttpRecordingSource;

/// setlist — build playlists by composing typed pipeline elements.
#[derive(Parser)]
#[command(
    name = "setlist",
    about = "setlist — build playlists by composing typed pipeline elements",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/setlist.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/setlist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a playlist from a patch.
    Playlist {
        /// Patch slug (see `setlist list`).
        patch: String,

        /// Patch arguments, in the order shown by `setlist info <patch>`.
        args: Vec<String>,

        /// Print resolution progress and debug logs.
        #[arg(long, short = 'd')]
        debug: bool,

        /// Resolution progress on stderr: off, human or json.
        /// Defaults to human with `--debug`, off otherwise.
        #[arg(long)]
        progress: Option<ProgressMode>,

        /// Also write the playlist as JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List available patches.
    List,

    /// Show a patch's description and expected inputs.
    Info {
        /// Patch slug.
        patch: String,
    },
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Playlist { debug: true, .. });
    init_tracing(debug);

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    let source = HttpRecordingSource::from_config(&cfg).context("Failed to create HTTP client")?;
    let registry = PatchRegistry::with_builtins(&cfg, Arc::new(source))?;

    match cli.command {
        Commands::List => {
            commands::run_list(&registry)?;
        }
        Commands::Info { patch } => {
            commands::run_info(&registry, &patch)?;
        }
        Commands::Playlist {
            patch,
            args,
            debug,
            progress,
            output,
        } => {
            if debug {
                eprintln!("- debug mode on");
            }
            commands::run_playlist(&registry, &patch, &args, debug, progress, output.as_deref())
                .await?;
        }
    }

    Ok(())
}
