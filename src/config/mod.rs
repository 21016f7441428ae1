//! User configuration for selfsync.
//!
//! Settings live in a single TOML file, `~/.selfsync/config.toml` by default
//! (`%LOCALAPPDATA%\selfsync\config.toml` on Windows). The location can be
//! overridden with `--config` or the `SELFSYNC_CONFIG` environment variable.
//! A missing default file is not an error; every field has a default.
//!
//! ```toml
//! # Tracked file used when none is given on the command line
//! file = "~/tools/app.py"
//!
//! [update]
//! repository = "owner/project"
//! branches = ["main", "master", "develop"]
//! extension = "py"
//! timeout_secs = 6
//! auto_apply = false
//!
//! [watch]
//! enabled = true
//! poll_interval = 1.0
//! debounce = 1.0
//! marker = "__version__"
//! ```
//!
//! Command-line flags take precedence over values from the file.

use crate::core::SyncError;
use crate::update::config::UpdateConfig;
use crate::watcher::WatchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "SELFSYNC_CONFIG";

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Default tracked file. `~` and `$VAR` are expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Remote lookup settings
    #[serde(default)]
    pub update: UpdateConfig,

    /// Watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// File this configuration was loaded from, if any
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl SyncConfig {
    /// Default configuration file location.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ConfigError`] if the home directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf, SyncError> {
        let base = if cfg!(target_os = "windows") {
            dirs::data_local_dir().map(|d| d.join("selfsync"))
        } else {
            dirs::home_dir().map(|d| d.join(".selfsync"))
        };

        base.map(|dir| dir.join("config.toml")).ok_or_else(|| SyncError::ConfigError {
            path: PathBuf::from("~/.selfsync/config.toml"),
            reason: "unable to determine home directory".to_string(),
        })
    }

    /// Load configuration.
    ///
    /// An explicit `path` (or `SELFSYNC_CONFIG`) must exist. Otherwise the
    /// default location is read if present, and defaults are used if not.
    pub async fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        if let Some(path) = path {
            return Self::load_from(path).await;
        }

        if let Some(env_path) = std::env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
            return Self::load_from(Path::new(&env_path)).await;
        }

        let path = Self::default_path()?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate the configuration file at `path`.
    pub async fn load_from(path: &Path) -> Result<Self, SyncError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::local_io("read configuration file", path, e))?;

        let config = Self::parse(&content, path)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text; `path` is used for error
    /// messages and recorded as [`SyncConfig::source_path`].
    pub fn parse(content: &str, path: &Path) -> Result<Self, SyncError> {
        let mut config: Self = toml::from_str(content).map_err(|e| SyncError::ConfigError {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        config.source_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SyncError> {
        let invalid = |reason: String| SyncError::ConfigError {
            path: self.display_path(),
            reason,
        };

        self.watch.validate().map_err(invalid)?;

        if self.update.timeout_secs == 0 {
            return Err(invalid("update.timeout_secs must be at least 1".to_string()));
        }
        if self.update.branches.is_empty() {
            return Err(invalid("update.branches must list at least one branch".to_string()));
        }
        if let Some(repo) = &self.update.repository
            && !is_repository_id(repo)
        {
            return Err(invalid(format!("update.repository must look like owner/name, got '{repo}'")));
        }
        Ok(())
    }

    /// Resolve the tracked file from the command-line argument or the
    /// configured `file`.
    pub fn tracked_file(&self, arg: Option<&Path>) -> Result<PathBuf, SyncError> {
        if let Some(path) = arg {
            return Ok(path.to_path_buf());
        }

        let Some(raw) = &self.file else {
            return Err(SyncError::ConfigError {
                path: self.display_path(),
                reason: "no file given on the command line and no `file` configured".to_string(),
            });
        };

        shellexpand::full(raw).map(|expanded| PathBuf::from(expanded.as_ref())).map_err(|e| {
            SyncError::ConfigError {
                path: self.display_path(),
                reason: format!("cannot expand file path '{raw}': {e}"),
            }
        })
    }

    fn display_path(&self) -> PathBuf {
        self.source_path.clone().unwrap_or_else(|| PathBuf::from("<defaults>"))
    }
}

/// `owner/name` with both parts non-empty
pub(crate) fn is_repository_id(repo: &str) -> bool {
    matches!(repo.split_once('/'), Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/'))
}
