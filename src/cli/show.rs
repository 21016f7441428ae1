use crate::config::SyncConfig;
use crate::marker::MarkerPattern;
use crate::update::{BackupManager, ContentHasher};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Arguments for `selfsync show`.
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// File to inspect (defaults to `file` from the configuration)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl ShowCommand {
    /// Print the marker, content hash, and backup count.
    pub async fn execute(self, config: &SyncConfig) -> Result<()> {
        let file = config.tracked_file(self.file.as_deref())?;
        let marker = MarkerPattern::new(&config.watch.marker)?;

        let version = marker.read_file(&file)?;
        let hash = ContentHasher::hash_file(&file)?;
        let backups = BackupManager::new(file.clone()).list_backups()?;

        match version {
            Some(version) => println!("Version: {}", version.green()),
            None => println!("Version: {}", "unknown".yellow()),
        }
        println!("SHA-256: {hash}");
        println!("Backups: {}", backups.len());
        Ok(())
    }
}
