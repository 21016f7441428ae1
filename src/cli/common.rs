//! Helpers shared by the CLI commands

use crate::watcher::WatcherHandle;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask a yes/no question on the terminal, defaulting to no.
///
/// When stdin is not a terminal nothing is read and the answer is no.
pub async fn confirm(question: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        eprintln!("{}", "Non-interactive input; answering no (pass --yes to apply).".yellow());
        return Ok(false);
    }

    print!("{} ", format!("{question} [y/N]:").green());
    io::stdout().flush()?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut response = String::new();
    reader.read_line(&mut response).await?;

    Ok(is_yes(&response))
}

pub(crate) fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

enum WatchEvent {
    Interrupted(io::Result<()>),
    Status(bool),
}

/// Print watcher status lines until Ctrl-C, then stop the watcher.
pub async fn watch_until_interrupted(handle: WatcherHandle) -> Result<()> {
    let mut status = handle.status();
    println!("{}", status.borrow_and_update().as_str());
    println!("{}", "Watching for changes (Ctrl-C to stop)".cyan());

    loop {
        let event = tokio::select! {
            signal = tokio::signal::ctrl_c() => WatchEvent::Interrupted(signal),
            changed = status.changed() => WatchEvent::Status(changed.is_ok()),
        };

        match event {
            WatchEvent::Interrupted(signal) => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            WatchEvent::Status(true) => println!("{}", status.borrow_and_update().as_str()),
            // Watcher task is gone
            WatchEvent::Status(false) => break,
        }
    }

    handle.stop().await.context("Failed to stop watcher")?;
    println!("{}", "Watcher stopped".yellow());
    Ok(())
}
