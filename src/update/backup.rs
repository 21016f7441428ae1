use crate::constants::BACKUP_SUFFIX;
use crate::core::SyncError;
use crate::utils::fs::{atomic_write, sibling_path};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Replaces the tracked file with new content while keeping a recovery copy.
///
/// Each replacement moves the current file to
/// `<original>.backup.<unix-timestamp>` and then writes the new bytes through
/// a sibling temporary file. Backups accumulate; [`restore_latest`] walks back
/// through them newest first.
///
/// # Failure semantics
///
/// The rename to the backup path and the write of the new content are two
/// separate steps with no rollback between them. If the write fails after the
/// rename succeeded, the backup exists and the original path is absent; it
/// never holds truncated content.
///
/// [`restore_latest`]: BackupManager::restore_latest
///
/// # Examples
///
/// ```rust,no_run
/// use selfsync::update::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = BackupManager::new(PathBuf::from("notes.txt"));
/// let backup = manager.replace_with(b"new content").await?;
/// println!("Previous version saved to {}", backup.display());
/// # Ok(())
/// # }
/// ```
pub struct BackupManager {
    original_path: PathBuf,
}

/// Outcome of a successful [`BackupManager::restore_latest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Backup whose content now occupies the original path.
    pub restored_from: PathBuf,
    /// Backup of the content that was replaced by the restore.
    pub previous_saved_to: PathBuf,
}

impl BackupManager {
    /// Create a manager for the file at `original_path`.
    pub const fn new(original_path: PathBuf) -> Self {
        Self {
            original_path,
        }
    }

    /// The managed file.
    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    /// Backup path for a given unix timestamp.
    #[must_use]
    pub fn backup_path_at(&self, timestamp: i64) -> PathBuf {
        sibling_path(&self.original_path, &format!("{BACKUP_SUFFIX}{timestamp}"))
    }

    /// Move the current file to a timestamped backup and write `content` in
    /// its place.
    ///
    /// When the original does not exist the rename is skipped; the returned
    /// path then names a backup that was never created.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LocalIo`] if the existence check, the rename or
    /// the write fails.
    pub async fn replace_with(&self, content: &[u8]) -> Result<PathBuf, SyncError> {
        let backup_path = self.backup_path_at(chrono::Utc::now().timestamp());

        let exists = fs::try_exists(&self.original_path)
            .await
            .map_err(|e| SyncError::local_io("check existence of", &self.original_path, e))?;

        if exists {
            debug!("Moving {} to {}", self.original_path.display(), backup_path.display());
            fs::rename(&self.original_path, &backup_path)
                .await
                .map_err(|e| SyncError::local_io("rename to backup", &self.original_path, e))?;
        }

        let target = self.original_path.clone();
        let content = content.to_vec();
        tokio::task::spawn_blocking(move || atomic_write(&target, &content))
            .await
            .map_err(|e| {
                SyncError::local_io("write", &self.original_path, std::io::Error::other(e))
            })??;

        info!("Replaced {} (backup: {})", self.original_path.display(), backup_path.display());
        Ok(backup_path)
    }

    /// Existing backups as `(timestamp, path)` pairs, oldest first.
    ///
    /// Files matching the backup naming scheme with a non-numeric suffix are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LocalIo`] if the backup directory cannot be
    /// listed.
    pub fn list_backups(&self) -> Result<Vec<(i64, PathBuf)>, SyncError> {
        let prefix = sibling_path(&self.original_path, BACKUP_SUFFIX);
        let pattern = format!("{}*", glob::Pattern::escape(&prefix.to_string_lossy()));
        let prefix = prefix.to_string_lossy().into_owned();

        let entries = glob::glob(&pattern).map_err(|e| {
            SyncError::local_io(
                "list backups of",
                &self.original_path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?;

        let mut backups = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                SyncError::local_io("inspect backup", path, e.into())
            })?;

            let suffix = path.to_string_lossy().strip_prefix(prefix.as_str()).map(str::to_string);
            match suffix.as_deref().map(str::parse::<i64>) {
                Some(Ok(timestamp)) => backups.push((timestamp, path)),
                _ => debug!("Ignoring non-backup file {}", path.display()),
            }
        }

        backups.sort();
        Ok(backups)
    }

    /// The most recent backup, if any.
    ///
    /// # Errors
    ///
    /// See [`BackupManager::list_backups`].
    pub fn latest_backup(&self) -> Result<Option<PathBuf>, SyncError> {
        Ok(self.list_backups()?.pop().map(|(_, path)| path))
    }

    /// Put the newest backup back in place.
    ///
    /// The current content is itself backed up first, and the restored
    /// backup file is removed, so repeated calls step further back.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoBackup`] when there is nothing to restore and
    /// [`SyncError::LocalIo`] when reading or writing fails.
    pub async fn restore_latest(&self) -> Result<RestoreOutcome, SyncError> {
        let Some(latest) = self.latest_backup()? else {
            return Err(SyncError::NoBackup {
                path: self.original_path.clone(),
            });
        };

        warn!("Restoring {} from {}", self.original_path.display(), latest.display());

        let content =
            fs::read(&latest).await.map_err(|e| SyncError::local_io("read backup", &latest, e))?;
        let previous_saved_to = self.replace_with(&content).await?;

        // Within the same second the new backup reuses the restored path
        if previous_saved_to != latest
            && let Err(e) = fs::remove_file(&latest).await
        {
            warn!("Failed to remove restored backup {}: {e}", latest.display());
        }

        Ok(RestoreOutcome {
            restored_from: latest,
            previous_saved_to,
        })
    }
}
