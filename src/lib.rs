//! selfsync - keep a file in sync with its remote copy and its own content.
//!
//! selfsync tracks one text file (a script, a config, any asset) and does two
//! things with it:
//!
//! - **Update check**: look for a raw copy of the file in a remote repository,
//!   trying each configured branch with the plain file name and an extension
//!   variant, and compare SHA-256 hashes. When they differ the local file can
//!   be replaced; the previous content is kept as `<file>.backup.<unix-ts>`.
//! - **Version marker**: a line such as `__version__ = '3f9a1c02be'` inside the
//!   file. A background watcher polls the file and, after an external edit,
//!   rewrites the marker to the first ten hex characters of the content hash.
//!
//! Every write to the tracked file goes to `<file>.tmp` first and is renamed
//! over the target.
//!
//! # Modules
//!
//! - [`cli`] - command-line interface (`check`, `watch`, `stamp`, `show`, `rollback`)
//! - [`config`] - `~/.selfsync/config.toml` loading and validation
//! - [`core`] - error types and user-facing error display
//! - [`marker`] - marker parsing and in-place rewriting
//! - [`update`] - remote lookup, hash comparison, backup and restore
//! - [`watcher`] - the polling task that stamps the marker
//! - [`utils`] - atomic writes and file metadata helpers
//! - [`constants`] - defaults shared across modules
//!
//! # Example
//!
//! ```rust,no_run
//! use selfsync::update::{BackupManager, UpdateChecker, UpdateStatus};
//! use selfsync::update::config::UpdateConfig;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let checker = UpdateChecker::from_config(&UpdateConfig::default(), "owner/project")?;
//! if let UpdateStatus::Found(remote) = checker.check(Path::new("app.py")).await?
//!     && !remote.is_identical
//! {
//!     BackupManager::new("app.py".into()).replace_with(&remote.candidate.bytes).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod marker;
pub mod update;
pub mod utils;
pub mod watcher;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
