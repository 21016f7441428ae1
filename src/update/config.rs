use crate::constants::{
    DEFAULT_BRANCHES, DEFAULT_REMOTE_HOST, DEFAULT_VARIANT_EXTENSION, FETCH_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for looking up and applying the remote copy of the tracked file.
///
/// # TOML Example
/// ```toml
/// [update]
/// repository = "owner/project"
/// host = "raw.githubusercontent.com"
/// branches = ["main", "master", "develop"]
/// extension = "py"
/// timeout_secs = 6
/// auto_apply = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Repository identifier (`owner/name`) holding the remote copy.
    ///
    /// There is no default; it must come from the config file or `--repo`.
    #[serde(default)]
    pub repository: Option<String>,

    /// Host (or full base URL such as `http://127.0.0.1:8080`) serving raw
    /// files at `<repo>/<branch>/<filename>`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Branches to try, highest priority first.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    /// Extension appended to the file name for the second lookup variant.
    /// An empty string disables the variant.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Replace the local file without prompting when the remote differs.
    #[serde(default)]
    pub auto_apply: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            repository: None,
            host: default_host(),
            branches: default_branches(),
            extension: default_extension(),
            timeout_secs: default_timeout_secs(),
            auto_apply: false,
        }
    }
}

impl UpdateConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    DEFAULT_REMOTE_HOST.to_string()
}

fn default_branches() -> Vec<String> {
    DEFAULT_BRANCHES.iter().map(|b| (*b).to_string()).collect()
}

fn default_extension() -> String {
    DEFAULT_VARIANT_EXTENSION.to_string()
}

const fn default_timeout_secs() -> u64 {
    FETCH_TIMEOUT.as_secs()
}
