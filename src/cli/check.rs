//! Compare the tracked file with its remote copy and optionally replace it.
//!
//! The remote copy is searched under every configured branch, first with the
//! local file name and then with the extension variant:
//!
//! ```bash
//! selfsync check app.py --repo owner/project          # prompt before replacing
//! selfsync check app.py --repo owner/project --yes    # replace without asking
//! selfsync check --no-watch                           # file and repo from config
//! ```
//!
//! Unless `--no-watch` is given (or `watch.enabled = false`), the watcher is
//! started before the check and keeps running afterwards until Ctrl-C.

use super::common;
use crate::config::{SyncConfig, is_repository_id};
use crate::update::{BackupManager, ContentHasher, RemoteMatch, UpdateChecker, UpdateStatus};
use crate::watcher::FileWatcher;
use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments for `selfsync check`.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// File to check (defaults to `file` from the configuration)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Repository holding the remote copy, as `owner/name`
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Replace the local file without prompting when the remote differs
    #[arg(short, long)]
    pub yes: bool,

    /// Do not start the watcher
    #[arg(long)]
    pub no_watch: bool,
}

impl CheckCommand {
    /// Run the check.
    pub async fn execute(self, config: &SyncConfig) -> Result<()> {
        let file = config.tracked_file(self.file.as_deref())?;
        let repo = self.repository(config)?;

        let watcher = if config.watch.enabled && !self.no_watch {
            Some(FileWatcher::new(&file, &config.watch)?.spawn())
        } else {
            None
        };

        let result = self.run_check(config, &file, &repo).await;

        match watcher {
            Some(handle) if result.is_ok() => common::watch_until_interrupted(handle).await?,
            Some(handle) => handle.stop().await?,
            None => {}
        }

        result
    }

    fn repository(&self, config: &SyncConfig) -> Result<String> {
        let repo = self.repo.clone().or_else(|| config.update.repository.clone()).ok_or_else(|| {
            anyhow!("No repository configured. Pass --repo owner/name or set update.repository")
        })?;

        if !is_repository_id(&repo) {
            bail!("Invalid repository '{repo}': expected owner/name");
        }
        Ok(repo)
    }

    async fn run_check(&self, config: &SyncConfig, file: &Path, repo: &str) -> Result<()> {
        let checker = UpdateChecker::from_config(&config.update, repo)?;

        println!("{}", format!("Checking {} against {}...", file.display(), repo).cyan());

        match checker.check(file).await? {
            UpdateStatus::NotFound {
                repo,
                filename,
            } => {
                println!("{}", format!("No remote copy of {filename} found in {repo}").yellow());
            }
            UpdateStatus::Found(remote) if remote.is_identical => {
                println!(
                    "{}",
                    format!(
                        "Up to date with {}/{} ({})",
                        remote.candidate.branch,
                        remote.candidate.filename,
                        ContentHasher::short(&remote.remote_hash)
                    )
                    .green()
                );
            }
            UpdateStatus::Found(remote) => {
                self.offer_update(config, file, remote).await?;
            }
        }

        Ok(())
    }

    async fn offer_update(&self, config: &SyncConfig, file: &Path, remote: RemoteMatch) -> Result<()> {
        println!(
            "{}",
            format!(
                "Remote copy differs: {}/{} ({} -> {})",
                remote.candidate.branch,
                remote.candidate.filename,
                ContentHasher::short(&remote.local_hash),
                ContentHasher::short(&remote.remote_hash)
            )
            .yellow()
        );

        let apply = if self.yes || config.update.auto_apply {
            debug!(yes = self.yes, auto_apply = config.update.auto_apply, "Applying without prompt");
            true
        } else {
            common::confirm("Replace the local file with the remote copy?").await?
        };

        if !apply {
            println!("{}", "Update skipped".yellow());
            return Ok(());
        }

        let manager = BackupManager::new(file.to_path_buf());
        let backup = manager
            .replace_with(&remote.candidate.bytes)
            .await
            .with_context(|| format!("Failed to replace {}", file.display()))?;

        println!("{}", format!("Updated {}", file.display()).green());
        if backup.exists() {
            println!("Backup saved to {}", backup.display());
        }
        Ok(())
    }
}
