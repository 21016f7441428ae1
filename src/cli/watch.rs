//! Keep the version marker of a file in sync with its content.

use super::common;
use crate::config::SyncConfig;
use crate::watcher::FileWatcher;
use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

/// Arguments for `selfsync watch`.
#[derive(Args, Debug)]
pub struct WatchCommand {
    /// File to watch (defaults to `file` from the configuration)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Seconds between polls, overriding `watch.poll_interval`
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<f64>,
}

impl WatchCommand {
    /// Watch until Ctrl-C.
    pub async fn execute(self, config: &SyncConfig) -> Result<()> {
        if !config.watch.enabled {
            bail!("Watching is disabled (watch.enabled = false in the configuration)");
        }

        let file = config.tracked_file(self.file.as_deref())?;

        let mut watch_config = config.watch.clone();
        if let Some(interval) = self.interval {
            watch_config.poll_interval = interval;
        }
        if let Err(reason) = watch_config.validate() {
            bail!("Invalid --interval: {reason}");
        }

        let handle = FileWatcher::new(&file, &watch_config)?.spawn();
        common::watch_until_interrupted(handle).await
    }
}
