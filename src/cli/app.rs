//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::sync_cmd;
use crate::storage::Config;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "DOCSYNC_LOG";

#[derive(Parser)]
#[command(name = "docsync")]
#[command(author, version, about = "Keeps an addon's syntax documentation in sync with the docs site")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Addon data directory holding docsync.toml and the key file
    #[arg(long, global = true, env = "DOCSYNC_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default docsync.toml into the data directory
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Validate the API key against the docs service
    Check,

    /// Print the records extracted from a registry snapshot
    Inspect {
        /// Registry snapshot (JSON)
        #[arg(long)]
        registry: PathBuf,
    },

    /// Show what a sync would upload, without uploading
    Diff {
        /// Registry snapshot (JSON)
        #[arg(long)]
        registry: PathBuf,
    },

    /// Check the key, download, reconcile and upload
    Sync {
        /// Registry snapshot (JSON)
        #[arg(long)]
        registry: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Init { force } => {
            let output = Output::new(cli.format.unwrap_or_default(), cli.verbose);
            sync_cmd::init(&output, &cli.data_dir, *force)?
        }
        Commands::Check => {
            let (config, output) = session(&cli)?;
            sync_cmd::check(&output, &config)?
        }
        Commands::Inspect { registry } => {
            let (config, output) = session(&cli)?;
            sync_cmd::inspect(&output, &config, registry)?
        }
        Commands::Diff { registry } => {
            let (config, output) = session(&cli)?;
            sync_cmd::diff(&output, &config, registry)?
        }
        Commands::Sync { registry } => {
            let (config, output) = session(&cli)?;
            sync_cmd::sync(&output, &config, registry)?
        }
    }

    Ok(())
}

/// Loads the addon config and picks the output format
fn session(cli: &Cli) -> Result<(Config, Output)> {
    let config = Config::load(&cli.data_dir)?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose_ctx(
        "config",
        &format!("Using data directory: {}", config.data_dir.display()),
    );
    Ok((config, output))
}

/// Installs the stderr log subscriber
///
/// `DOCSYNC_LOG` takes any `EnvFilter` directive; without it the level is
/// `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "docsync=debug" } else { "docsync=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
