//! Global constants used throughout the selfsync codebase.
//!
//! This module contains timeouts, polling intervals, and the defaults for the
//! remote lookup and the version marker. Defining them centrally keeps the
//! defaults in [`crate::update::config`] and [`crate::watcher::config`] in
//! step with the code that relies on them.

use std::time::Duration;

/// Host serving raw file contents for `<repo>/<branch>/<filename>` paths.
pub const DEFAULT_REMOTE_HOST: &str = "raw.githubusercontent.com";

/// Branches tried, in priority order, when looking for the remote copy.
pub const DEFAULT_BRANCHES: &[&str] = &["main", "master", "develop"];

/// Extension appended to the tracked file name to form the second filename
/// variant when the name does not already carry it.
pub const DEFAULT_VARIANT_EXTENSION: &str = "py";

/// Identifier the version marker is assigned to.
pub const DEFAULT_MARKER_IDENT: &str = "__version__";

/// Per-request timeout for remote fetches (6 seconds).
///
/// A check tries up to `branches × variants` candidates sequentially, so the
/// worst case wait is this value times the candidate count.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(6);

/// Default watcher poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 1.0;

/// Default window after a self-triggered write during which modifications
/// are treated as echoes of that write.
pub const DEFAULT_DEBOUNCE_SECS: f64 = 1.0;

/// Number of leading hex characters of the content hash used as the marker.
pub const SHORT_HASH_LEN: usize = 10;

/// Read buffer used when hashing files.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// User agent sent with every remote fetch.
pub const USER_AGENT: &str = concat!("selfsync/", env!("CARGO_PKG_VERSION"));

/// Suffix inserted between the tracked file name and the backup timestamp.
pub const BACKUP_SUFFIX: &str = ".backup.";

/// Suffix of the sibling file used for write-then-rename.
pub const TEMP_SUFFIX: &str = ".tmp";
