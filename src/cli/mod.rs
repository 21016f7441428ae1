//! Command-line interface for selfsync.
//!
//! # Available Commands
//!
//! - `check` - compare the tracked file with its remote copy, optionally
//!   replace it, and keep watching
//! - `watch` - keep the version marker in sync with the file content
//! - `stamp` - rewrite the version marker once
//! - `show` - print the current marker and content hash
//! - `rollback` - restore the newest backup
//!
//! # Usage
//!
//! ```bash
//! selfsync check app.py --repo owner/project --no-watch
//! selfsync watch app.py
//! selfsync stamp app.py --value 1.2.0
//! selfsync show app.py
//! selfsync rollback app.py
//! ```
//!
//! Global flags: `--verbose` (debug logging), `--quiet` (no logging),
//! `--config <path>` (configuration file, see [`crate::config`]).
//! `RUST_LOG` takes precedence over both logging flags.

pub mod check;
pub mod common;
pub mod rollback;
pub mod show;
pub mod stamp;
pub mod watch;


use crate::config::SyncConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can run commands with an explicit
/// configuration file and without touching the global logger.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging unless `RUST_LOG` is set
    pub log_level: Option<String>,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// A configuration with logging off and the default config location.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Only the first call in a process has an effect.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(format!("selfsync={level}"))
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Keep a file's version marker in sync with its content and with a remote copy.
#[derive(Parser, Debug)]
#[command(
    name = "selfsync",
    about = "Keep a file in sync with its remote copy and stamp its version marker",
    version,
    long_about = "selfsync compares a local file with its raw copy in a remote repository, \
                  replaces it on request (keeping a timestamped backup), and rewrites an \
                  in-file version marker whenever the file changes."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ~/.selfsync/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the remote copy and optionally replace the local file
    Check(check::CheckCommand),

    /// Rewrite the version marker whenever the file changes
    Watch(watch::WatchCommand),

    /// Rewrite the version marker once
    Stamp(stamp::StampCommand),

    /// Show the version marker and content hash
    Show(show::ShowCommand),

    /// Restore the newest backup
    Rollback(rollback::RollbackCommand),
}

impl Cli {
    /// Initialize logging from the global flags and run the command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the command with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let settings = SyncConfig::load(config.config_path.as_deref())
            .await
            .context("Failed to load configuration")?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(&settings).await,
            Commands::Watch(cmd) => cmd.execute(&settings).await,
            Commands::Stamp(cmd) => cmd.execute(&settings).await,
            Commands::Show(cmd) => cmd.execute(&settings).await,
            Commands::Rollback(cmd) => cmd.execute(&settings).await,
        }
    }

    /// The parsed subcommand
    pub fn command(&self) -> &Commands {
        &self.command
    }
}
