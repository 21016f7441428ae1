use crate::config::SyncConfig;
use crate::update::BackupManager;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Arguments for `selfsync rollback`.
#[derive(Args, Debug)]
pub struct RollbackCommand {
    /// File to restore (defaults to `file` from the configuration)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl RollbackCommand {
    /// Restore the newest backup over the file.
    pub async fn execute(self, config: &SyncConfig) -> Result<()> {
        let file = config.tracked_file(self.file.as_deref())?;
        println!("{}", format!("Rolling back {}...", file.display()).yellow());

        let outcome = BackupManager::new(file.clone())
            .restore_latest()
            .await
            .context("Failed to restore from backup")?;

        println!("{}", format!("Restored from {}", outcome.restored_from.display()).green());
        if outcome.previous_saved_to.exists() {
            println!("Previous content saved to {}", outcome.previous_saved_to.display());
        }
        Ok(())
    }
}
