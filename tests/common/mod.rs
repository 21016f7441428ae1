//! Shared helpers for the integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary working area with its own configuration file and home
/// directory, so the user's real configuration is never read.
pub struct TestEnvironment {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl TestEnvironment {
    /// Environment with an empty configuration file
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Environment with the given configuration file content
    pub fn with_config(config: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config).unwrap();
        Self {
            temp_dir,
            config_path,
        }
    }

    /// Root of the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name` inside the environment and return its path
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Read a file inside the environment
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap()
    }

    /// The configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `selfsync --config <config>` with a clean environment
    pub fn selfsync_command(&self) -> Command {
        let mut cmd = Command::cargo_bin("selfsync").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("SELFSYNC_CONFIG")
            .arg("--config")
            .arg(&self.config_path);
        cmd
    }
}

/// `[update]` section pointing at a local raw-file server
pub fn update_config(base_url: &str, repo: &str) -> String {
    format!("[update]\nrepository = \"{repo}\"\nhost = \"{base_url}\"\ntimeout_secs = 5\n")
}
