//! Remote update checking and local replacement of the tracked file.
//!
//! # Architecture Overview
//!
//! - **[`UpdateChecker`]**: walks the ordered `(branch, filename)` candidates,
//!   fetches the first one available, and compares content hashes
//! - **[`RemoteSource`]** / **[`RawHttpSource`]**: the fetch seam and its
//!   HTTP implementation
//! - **[`BackupManager`]**: moves the current file to a timestamped backup and
//!   writes the new content atomically; restores the newest backup on rollback
//! - **[`ContentHasher`]**: SHA-256 content hashes and short marker values
//! - **[`config::UpdateConfig`]**: the `[update]` configuration section
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Candidate search
//!    ├── for each branch (main, master, develop)
//!    │   └── for each variant (name, name.<ext> if missing)
//!    │       └── GET https://<host>/<repo>/<branch>/<variant>
//!    └── stop at the first success; all failed -> NotFound
//!
//! 2. Comparison
//!    └── SHA-256(remote) == SHA-256(local) -> identical
//!
//! 3. Apply (caller decides: prompt or auto-apply)
//!    ├── rename <file> -> <file>.backup.<unix-ts>
//!    └── write <file>.tmp, rename over <file>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use selfsync::update::{BackupManager, UpdateChecker, UpdateStatus, config::UpdateConfig};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdateConfig::default();
//! let checker = UpdateChecker::from_config(&config, "owner/project")?;
//! let path = Path::new("app.py");
//!
//! if let UpdateStatus::Found(remote) = checker.check(path).await?
//!     && !remote.is_identical
//! {
//!     let backup = BackupManager::new(path.to_path_buf())
//!         .replace_with(&remote.candidate.bytes)
//!         .await?;
//!     println!("Updated, backup at {}", backup.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod checker;
/// Configuration for remote lookups and applying updates.
pub mod config;
pub mod remote;
/// SHA-256 content hashing.
pub mod verification;


pub use backup::{BackupManager, RestoreOutcome};
pub use checker::{RemoteCandidate, RemoteMatch, UpdateChecker, UpdateStatus};
pub use remote::{RawHttpSource, RemoteSource};
pub use verification::ContentHasher;
