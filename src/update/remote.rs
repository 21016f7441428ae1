//! Remote sources for the published copy of the tracked file.
//!
//! The update checker only needs one operation from a source: fetch the raw
//! bytes of `<filename>` on `<branch>`. [`RemoteSource`] is that seam;
//! [`RawHttpSource`] is the production implementation speaking plain HTTP(S)
//! to a raw-content host.

use crate::constants::USER_AGENT;
use crate::core::SyncError;
use crate::update::config::UpdateConfig;
use anyhow::{Context, Result, bail};
use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// A place the checker can fetch candidate files from.
pub trait RemoteSource {
    /// Fetch the bytes of `filename` on `branch`.
    ///
    /// Any failure, including "not found", is reported as
    /// [`SyncError::NetworkUnavailable`] so the caller can move on to the
    /// next candidate.
    fn fetch(
        &self,
        branch: &str,
        filename: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SyncError>> + Send;
}

/// Fetches `https://<host>/<repo>/<branch>/<filename>` with a fixed user
/// agent and per-request timeout. No authentication.
///
/// The file name is appended as a single path segment, so characters such
/// as `#`, `?`, `%` or `/` in it are percent-encoded. Slashes in a branch name
/// separate segments, as raw-content hosts expect.
#[derive(Debug, Clone)]
pub struct RawHttpSource {
    client: reqwest::Client,
    base_url: Url,
    repo: Vec<String>,
}

impl RawHttpSource {
    /// Build a source for `repo` on `host`.
    ///
    /// `host` may be a bare host name (`https://` is assumed) or a full base
    /// URL including scheme and port.
    ///
    /// # Errors
    ///
    /// Fails if `host` does not form a valid base URL, or if the HTTP client
    /// cannot be constructed (e.g. TLS backend initialization failure).
    pub fn new(host: &str, repo: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let base_url =
            Url::parse(&base).with_context(|| format!("Invalid remote host '{host}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("Invalid remote host '{host}': cannot hold a path");
        }

        Ok(Self {
            client,
            base_url,
            repo: repo.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
        })
    }

    /// Build a source from the `[update]` configuration section.
    ///
    /// # Errors
    ///
    /// See [`RawHttpSource::new`].
    pub fn from_config(config: &UpdateConfig, repo: &str) -> Result<Self> {
        Self::new(&config.host, repo, config.timeout())
    }

    /// URL of one candidate.
    #[must_use]
    pub fn url(&self, branch: &str, filename: &str) -> Url {
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, which `new` rejects
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&self.repo).extend(branch.split('/')).push(filename);
        }
        url
    }
}

impl RemoteSource for RawHttpSource {
    async fn fetch(&self, branch: &str, filename: &str) -> Result<Vec<u8>, SyncError> {
        let url = self.url(branch, filename);
        debug!(url = %url, "Fetching remote candidate");

        let unavailable = |reason: String| SyncError::NetworkUnavailable {
            url: url.to_string(),
            reason,
        };

        let response =
            self.client.get(url.clone()).send().await.map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_from_bare_host() {
        let source =
            RawHttpSource::new("raw.githubusercontent.com", "owner/project", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.url("main", "app.py").as_str(),
            "https://raw.githubusercontent.com/owner/project/main/app.py"
        );
    }

    #[test]
    fn test_url_from_base_url() {
        let source =
            RawHttpSource::new("http://127.0.0.1:8080/", "/owner/project/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.url("develop", "notes").as_str(),
            "http://127.0.0.1:8080/owner/project/develop/notes"
        );
    }

    #[test]
    fn test_url_escapes_reserved_characters() {
        let source =
            RawHttpSource::new("https://mirror.example/raw/", "owner/project", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.url("main", "v#2?.py").as_str(),
            "https://mirror.example/raw/owner/project/main/v%232%3F.py"
        );
        assert_eq!(
            source.url("release/1.0", "50% off.txt").as_str(),
            "https://mirror.example/raw/owner/project/release/1.0/50%25%20off.txt"
        );
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(RawHttpSource::new("http://[::1", "owner/project", Duration::from_secs(1)).is_err());
        assert!(RawHttpSource::new("mailto:someone", "owner/project", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_candidate_failure() {
        // Bind and drop a listener to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = RawHttpSource::new(
            &format!("http://127.0.0.1:{port}"),
            "owner/project",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = source.fetch("main", "app.py").await.unwrap_err();
        assert!(err.is_candidate_failure());
    }
}
