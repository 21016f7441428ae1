//! One-shot marker rewrite.

use crate::config::SyncConfig;
use crate::marker::MarkerPattern;
use crate::update::ContentHasher;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Arguments for `selfsync stamp`.
#[derive(Args, Debug)]
pub struct StampCommand {
    /// File to stamp (defaults to `file` from the configuration)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Explicit marker value instead of the content hash
    #[arg(long, value_name = "VALUE")]
    pub value: Option<String>,
}

impl StampCommand {
    /// Rewrite the marker once.
    pub async fn execute(self, config: &SyncConfig) -> Result<()> {
        let file = config.tracked_file(self.file.as_deref())?;
        let marker = MarkerPattern::new(&config.watch.marker)?;

        let value = match self.value {
            Some(value) => value,
            None => {
                let path = file.clone();
                let hash = tokio::task::spawn_blocking(move || ContentHasher::hash_file(&path))
                    .await
                    .context("Hashing task failed")??;
                ContentHasher::short(&hash).to_string()
            }
        };

        let path = file.clone();
        let rewrite_value = value.clone();
        tokio::task::spawn_blocking(move || marker.rewrite_file(&path, &rewrite_value))
            .await
            .context("Rewrite task failed")?
            .with_context(|| format!("Failed to stamp {}", file.display()))?;

        println!("{}", format!("Version: {value}").green());
        Ok(())
    }
}
