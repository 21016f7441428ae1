use crate::constants::{DEFAULT_BRANCHES, DEFAULT_VARIANT_EXTENSION};
use crate::core::SyncError;
use crate::update::config::UpdateConfig;
use crate::update::remote::{RawHttpSource, RemoteSource};
use crate::update::verification::ContentHasher;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

/// A successfully fetched remote copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCandidate {
    /// Branch the copy was found on.
    pub branch: String,
    /// File name variant that matched.
    pub filename: String,
    /// Raw remote bytes.
    pub bytes: Vec<u8>,
}

/// Comparison of a remote copy with the local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMatch {
    /// The remote copy that was found.
    pub candidate: RemoteCandidate,
    /// SHA-256 of the local bytes (empty bytes if the file was unreadable).
    pub local_hash: String,
    /// SHA-256 of the remote bytes.
    pub remote_hash: String,
    /// Whether local and remote content hashes are equal.
    pub is_identical: bool,
}

/// Result of one update check. Computed fresh on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// No candidate location returned the file.
    NotFound {
        /// Repository that was searched
        repo: String,
        /// Local file name the search started from
        filename: String,
    },
    /// A remote copy was found and compared.
    Found(RemoteMatch),
}

impl UpdateStatus {
    /// Convert into the found match, or [`SyncError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] when no candidate succeeded.
    pub fn found(self) -> Result<RemoteMatch, SyncError> {
        match self {
            Self::Found(remote) => Ok(remote),
            Self::NotFound {
                repo,
                filename,
            } => Err(SyncError::NotFound {
                repo,
                filename,
            }),
        }
    }
}

/// Looks for the published copy of a local file and compares it.
///
/// Candidates are tried strictly in order: for each branch, the plain file
/// name and then the name with the configured extension appended (when it
/// is not already present). The first successful fetch wins. Failures of
/// individual candidates are logged and skipped.
///
/// Nothing is written; applying the remote copy is the caller's decision
/// (see [`BackupManager::replace_with`](crate::update::BackupManager::replace_with)).
pub struct UpdateChecker<S> {
    source: S,
    repo: String,
    branches: Vec<String>,
    extension: String,
}

impl UpdateChecker<RawHttpSource> {
    /// Build a checker fetching over HTTP according to `config`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn from_config(config: &UpdateConfig, repo: &str) -> Result<Self> {
        let source = RawHttpSource::from_config(config, repo)?;
        Ok(Self::new(source, repo)
            .with_branches(config.branches.clone())
            .with_extension(&config.extension))
    }
}

impl<S: RemoteSource> UpdateChecker<S> {
    /// Create a checker with the default branch list and extension.
    pub fn new(source: S, repo: impl Into<String>) -> Self {
        Self {
            source,
            repo: repo.into(),
            branches: DEFAULT_BRANCHES.iter().map(|b| (*b).to_string()).collect(),
            extension: DEFAULT_VARIANT_EXTENSION.to_string(),
        }
    }

    /// Replace the branch priority list.
    #[must_use]
    pub fn with_branches(mut self, branches: Vec<String>) -> Self {
        self.branches = branches;
        self
    }

    /// Replace the extension used for the second filename variant.
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Access the underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// File name variants tried on each branch.
    #[must_use]
    pub fn filename_variants(&self, filename: &str) -> Vec<String> {
        if self.extension.is_empty() || filename.ends_with(&format!(".{}", self.extension)) {
            vec![filename.to_string()]
        } else {
            vec![filename.to_string(), format!("{filename}.{}", self.extension)]
        }
    }

    /// Every `(branch, filename)` pair in the order it is tried.
    #[must_use]
    pub fn candidates(&self, filename: &str) -> Vec<(String, String)> {
        let variants = self.filename_variants(filename);
        self.branches
            .iter()
            .flat_map(|branch| variants.iter().map(move |v| (branch.clone(), v.clone())))
            .collect()
    }

    /// Fetch the first candidate that succeeds.
    pub async fn find_remote(&self, filename: &str) -> Option<RemoteCandidate> {
        for (branch, variant) in self.candidates(filename) {
            match self.source.fetch(&branch, &variant).await {
                Ok(bytes) => {
                    info!(branch = %branch, filename = %variant, "Found remote copy");
                    return Some(RemoteCandidate {
                        branch,
                        filename: variant,
                        bytes,
                    });
                }
                Err(e) if e.is_candidate_failure() => {
                    debug!(branch = %branch, filename = %variant, "Candidate unavailable: {e}");
                }
                Err(e) => {
                    warn!(branch = %branch, filename = %variant, "Skipping candidate: {e}");
                }
            }
        }

        None
    }

    /// Check whether the remote copy of `local_path` differs from it.
    ///
    /// An empty remote body counts as no remote copy. An unreadable local
    /// file is compared as empty content.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LocalIo`] only if `local_path` has no file name.
    pub async fn check(&self, local_path: &Path) -> Result<UpdateStatus, SyncError> {
        let filename = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                SyncError::local_io(
                    "determine file name of",
                    local_path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;

        debug!(repo = %self.repo, filename = %filename, "Checking for remote copy");

        let candidate = match self.find_remote(&filename).await {
            Some(candidate) if candidate.bytes.is_empty() => {
                info!(
                    branch = %candidate.branch,
                    filename = %candidate.filename,
                    "Remote copy is empty; treating as not found"
                );
                None
            }
            found => found,
        };

        let Some(candidate) = candidate else {
            info!(repo = %self.repo, filename = %filename, "No remote copy found");
            return Ok(UpdateStatus::NotFound {
                repo: self.repo.clone(),
                filename,
            });
        };

        let local_bytes = match tokio::fs::read(local_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {}: {e}; comparing as empty", local_path.display());
                Vec::new()
            }
        };

        let local_hash = ContentHasher::hash_bytes(&local_bytes);
        let remote_hash = ContentHasher::hash_bytes(&candidate.bytes);
        let is_identical = local_hash == remote_hash;

        Ok(UpdateStatus::Found(RemoteMatch {
            candidate,
            local_hash,
            remote_hash,
            is_identical,
        }))
    }
}
