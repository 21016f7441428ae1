//! Background version-marker watcher.
//!
//! Polls the tracked file's modification time. When another process changes
//! the file, the watcher hashes the content and rewrites the marker line to
//! the first ten hex characters of that hash.
//!
//! Its own writes are not treated as changes: the post-write modification time
//! becomes the new baseline, and any further change inside the debounce window
//! is ignored.
//!
//! ```rust,no_run
//! use selfsync::watcher::{FileWatcher, WatchConfig};
//!
//! # async fn example() -> Result<(), selfsync::core::SyncError> {
//! let handle = FileWatcher::new("app.py", &WatchConfig::default())?.spawn();
//! println!("{}", *handle.status().borrow());
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod file_watcher;
pub mod state;

pub use config::WatchConfig;
pub use file_watcher::{FileWatcher, TickOutcome, WatcherHandle};
pub use state::{Observation, WatchState};
