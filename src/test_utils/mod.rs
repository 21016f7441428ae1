//! Test helpers shared by unit and integration tests.
//!
//! Available under `cfg(test)` and with the `test-utils` feature.
//!
//! - [`init_test_logging`] - one-time tracing setup writing to the test output
//! - [`StaticSource`] - in-memory [`RemoteSource`] that records every attempt
//! - [`RawFileServer`] - a minimal blocking HTTP server serving fixed files,
//!   for exercising [`RawHttpSource`](crate::update::RawHttpSource) end to end

use crate::core::SyncError;
use crate::update::RemoteSource;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=selfsync=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// In-memory remote keyed by `(branch, filename)`.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    files: HashMap<(String, String), Vec<u8>>,
    attempts: Arc<Mutex<Vec<(String, String)>>>,
}

impl StaticSource {
    /// An empty source; every fetch fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` as `filename` on `branch`.
    #[must_use]
    pub fn with_file(mut self, branch: &str, filename: &str, bytes: &[u8]) -> Self {
        self.files.insert((branch.to_string(), filename.to_string()), bytes.to_vec());
        self
    }

    /// Every `(branch, filename)` fetched so far, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl RemoteSource for StaticSource {
    async fn fetch(&self, branch: &str, filename: &str) -> Result<Vec<u8>, SyncError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push((branch.to_string(), filename.to_string()));
        }

        self.files.get(&(branch.to_string(), filename.to_string())).cloned().ok_or_else(|| {
            SyncError::NetworkUnavailable {
                url: format!("static://{branch}/{filename}"),
                reason: "HTTP 404 Not Found".to_string(),
            }
        })
    }
}

/// Blocking HTTP/1.1 server answering `GET` requests from a fixed path map.
///
/// Unknown paths get `404`. Every connection is closed after one response.
/// The server thread runs until the process exits.
pub struct RawFileServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RawFileServer {
    /// Start serving `files` (request path, e.g. `/owner/repo/main/app.py`,
    /// to body) on an ephemeral localhost port.
    ///
    /// # Panics
    ///
    /// Panics if no localhost port can be bound.
    #[must_use]
    pub fn start(files: HashMap<String, Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let addr = listener.local_addr().expect("test server address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = Self::respond(stream, &files, &seen);
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Base URL (`http://127.0.0.1:<port>`) to use as the remote host.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request paths received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn respond(
        mut stream: TcpStream,
        files: &HashMap<String, Vec<u8>>,
        seen: &Mutex<Vec<String>>,
    ) -> std::io::Result<()> {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = stream.read(&mut buf)?;
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }

        let request = String::from_utf8_lossy(&request);
        let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
        if let Ok(mut seen) = seen.lock() {
            seen.push(path.clone());
        }

        let (status, body): (&str, &[u8]) = match files.get(&path) {
            Some(body) => ("200 OK", body.as_slice()),
            None => ("404 Not Found", &b"404: Not Found"[..]),
        };

        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes())?;
        stream.write_all(body)?;
        stream.flush()
    }
}
