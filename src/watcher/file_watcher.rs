//! Polling watcher that keeps the version marker in sync with file content

use super::config::WatchConfig;
use super::state::{Observation, WatchState};
use crate::core::SyncError;
use crate::marker::MarkerPattern;
use crate::update::ContentHasher;
use crate::utils::fs::modified_time;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// First modification time recorded
    Baseline,
    /// Nothing changed since the last poll
    Unchanged,
    /// Change attributed to the watcher's own write
    OwnEcho,
    /// External change; the marker was rewritten to this short hash
    Stamped(String),
}

/// Watches one file and rewrites its version marker after external edits
pub struct FileWatcher {
    path: PathBuf,
    marker: MarkerPattern,
    poll_interval: Duration,
    debounce: Duration,
    state: WatchState,
    status: watch::Sender<String>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// The current modification time (if the file exists) becomes the
    /// baseline, so nothing is rewritten until the file changes.
    pub fn new(path: impl Into<PathBuf>, config: &WatchConfig) -> Result<Self, SyncError> {
        let path = path.into();
        let marker = MarkerPattern::new(&config.marker)?;

        let baseline = modified_time(&path).ok();
        let version = marker.read_file(&path).ok().flatten().unwrap_or_else(|| "unknown".to_string());
        let (status, _) = watch::channel(format!("Version: {version}"));

        Ok(Self {
            path,
            marker,
            poll_interval: config.poll_interval(),
            debounce: config.debounce(),
            state: WatchState::new(baseline),
            status,
        })
    }

    /// The watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state
    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Subscribe to the human-readable status line
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Poll the file once.
    pub async fn tick(&mut self) -> Result<TickOutcome, SyncError> {
        let mtime = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .map_err(|e| SyncError::local_io("read modification time of", &self.path, e))?;

        match self.state.observe(mtime, Instant::now(), self.debounce) {
            Observation::Baseline => {
                debug!(path = %self.path.display(), "Recorded baseline modification time");
                Ok(TickOutcome::Baseline)
            }
            Observation::Unchanged => Ok(TickOutcome::Unchanged),
            Observation::OwnEcho => {
                debug!(path = %self.path.display(), "Ignoring change within debounce window");
                Ok(TickOutcome::OwnEcho)
            }
            Observation::Changed => self.stamp().await.map(TickOutcome::Stamped),
        }
    }

    async fn stamp(&mut self) -> Result<String, SyncError> {
        let path = self.path.clone();
        let marker = self.marker.clone();

        let (short, written_mtime) = tokio::task::spawn_blocking(move || {
            let hash = ContentHasher::hash_file(&path)?;
            let short = ContentHasher::short(&hash).to_string();
            marker.rewrite_file(&path, &short)?;
            Ok::<_, SyncError>((short, modified_time(&path).ok()))
        })
        .await
        .map_err(|e| SyncError::WatcherTick {
            reason: format!("rewrite task failed: {e}"),
        })??;

        self.state.record_self_write(Instant::now(), written_mtime);
        self.status.send_replace(format!("Version: {short} (updated)"));

        info!(path = %self.path.display(), version = %short, "Version marker updated");
        Ok(short)
    }

    /// Run the poll loop on a background task.
    pub fn spawn(self) -> WatcherHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let status = self.subscribe();
        let task = tokio::spawn(self.run(shutdown_rx));

        WatcherHandle {
            shutdown,
            task,
            status,
        }
    }

    /// Poll until a stop is requested.
    ///
    /// If the handle is dropped without a stop, polling continues for the
    /// life of the runtime.
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            path = %self.path.display(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Watcher started"
        );

        let mut listening = true;
        loop {
            // Some(true): stop signal changed, Some(false): handle dropped, None: poll due
            let woke = if listening {
                tokio::select! {
                    changed = shutdown.changed() => Some(changed.is_ok()),
                    () = tokio::time::sleep(self.poll_interval) => None,
                }
            } else {
                tokio::time::sleep(self.poll_interval).await;
                None
            };

            match woke {
                Some(true) if *shutdown.borrow() => break,
                Some(true) => continue,
                Some(false) => {
                    debug!("Watcher handle dropped; polling until exit");
                    listening = false;
                    continue;
                }
                None => {}
            }

            if let Err(e) = self.tick().await {
                warn!(path = %self.path.display(), "Watcher error: {}", e);
            }
        }

        info!(path = %self.path.display(), "Watcher stopped");
    }
}

/// Handle to a running watcher task
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    status: watch::Receiver<String>,
}

impl WatcherHandle {
    /// Receiver for the status line
    pub fn status(&self) -> watch::Receiver<String> {
        self.status.clone()
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to stop and wait for it to exit.
    pub async fn stop(self) -> Result<(), SyncError> {
        self.shutdown.send_replace(true);
        self.task.await.map_err(|e| SyncError::WatcherTick {
            reason: format!("watcher task failed: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use crate::update::BackupManager;
    use std::fs::{self, File};
    use std::time::SystemTime;
    use tempfile::TempDir;

    const ORIGINAL: &str = "__version__ = 'seed'\nprint('hello')\n";

    fn config(poll_ms: u64, debounce_secs: f64) -> WatchConfig {
        WatchConfig {
            poll_interval: poll_ms as f64 / 1000.0,
            debounce: debounce_secs,
            ..WatchConfig::default()
        }
    }

    fn set_mtime(path: &Path, mtime: SystemTime) {
        File::options().write(true).open(path).unwrap().set_modified(mtime).unwrap();
    }

    fn edit(path: &Path, content: &str) {
        let before = fs::metadata(path).and_then(|m| m.modified()).ok();
        fs::write(path, content).unwrap();
        let bumped = before.unwrap_or_else(SystemTime::now) + Duration::from_secs(5);
        set_mtime(path, bumped);
    }

    fn short_hash(content: &str) -> String {
        ContentHasher::short(&ContentHasher::hash_bytes(content.as_bytes())).to_string()
    }

    #[tokio::test]
    async fn test_initial_status_and_baseline() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();

        let mut watcher = FileWatcher::new(&file, &config(1000, 1.0)).unwrap();
        assert_eq!(*watcher.subscribe().borrow(), "Version: seed");
        assert!(watcher.state().last_mtime().is_some());
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&file).unwrap(), ORIGINAL);
    }

    #[tokio::test]
    async fn test_missing_file_reports_unknown() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("later.py");

        let mut watcher = FileWatcher::new(&file, &config(1000, 1.0)).unwrap();
        assert_eq!(*watcher.subscribe().borrow(), "Version: unknown");
        assert!(matches!(watcher.tick().await, Err(SyncError::LocalIo { .. })));

        fs::write(&file, "x = 1\n").unwrap();
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Baseline);
    }

    #[tokio::test]
    async fn test_external_edit_is_stamped_once() {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();

        let mut watcher = FileWatcher::new(&file, &config(1000, 1.0)).unwrap();
        let status = watcher.subscribe();

        let edited = "__version__ = 'seed'\nprint('edited')\n";
        edit(&file, edited);

        let expected = short_hash(edited);
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Stamped(expected.clone()));
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            format!("__version__ = '{expected}'\nprint('edited')\n")
        );
        assert_eq!(*status.borrow(), format!("Version: {expected} (updated)"));

        // The watcher's own write must not trigger another rewrite
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Unchanged);
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_change_inside_debounce_is_ignored() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();

        let mut watcher = FileWatcher::new(&file, &config(1000, 60.0)).unwrap();
        edit(&file, "print('one')\n");
        assert!(matches!(watcher.tick().await.unwrap(), TickOutcome::Stamped(_)));
        let stamped = fs::read_to_string(&file).unwrap();

        edit(&file, &stamped);
        assert_eq!(watcher.tick().await.unwrap(), TickOutcome::OwnEcho);
        assert_eq!(fs::read_to_string(&file).unwrap(), stamped);
    }

    #[tokio::test]
    async fn test_file_without_marker_gets_one_prepended() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "line one\n").unwrap();

        let mut watcher = FileWatcher::new(&file, &config(1000, 1.0)).unwrap();
        edit(&file, "line one\nline two\n");

        let expected = short_hash("line one\nline two\n");
        watcher.tick().await.unwrap();
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            format!("__version__ = '{expected}'\nline one\nline two\n")
        );
    }

    #[tokio::test]
    async fn test_spawned_watcher_survives_errors_and_stops() {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();

        let watcher = FileWatcher::new(&file, &config(20, 1.0)).unwrap();
        let handle = watcher.spawn();
        let mut status = handle.status();

        // Ticks fail while the file is missing
        fs::remove_file(&file).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        fs::write(&file, "print('back')\n").unwrap();
        set_mtime(&file, SystemTime::now() + Duration::from_secs(30));

        let expected = format!("Version: {} (updated)", short_hash("print('back')\n"));
        tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| *s == expected))
            .await
            .expect("watcher should stamp the recreated file")
            .unwrap();

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_replaced_file_is_stamped_once() {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();
        set_mtime(&file, SystemTime::now() - Duration::from_secs(60));

        let handle = FileWatcher::new(&file, &config(20, 1.0)).unwrap().spawn();
        let mut status = handle.status();

        let remote = "__version__ = '0.2.0'\nprint('remote')\n";
        let backup = BackupManager::new(file.clone()).replace_with(remote.as_bytes()).await.unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), ORIGINAL);

        let expected = short_hash(remote);
        let line = format!("Version: {expected} (updated)");
        tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| *s == line))
            .await
            .expect("watcher should stamp the replaced file")
            .unwrap();

        // Further polls must not rewrite the watcher's own output
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!status.has_changed().unwrap());
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            format!("__version__ = '{expected}'\nprint('remote')\n")
        );

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_first_poll() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.py");
        fs::write(&file, ORIGINAL).unwrap();

        let handle = FileWatcher::new(&file, &config(60_000, 1.0)).unwrap().spawn();
        tokio::time::timeout(Duration::from_secs(5), handle.stop()).await.unwrap().unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), ORIGINAL);
    }

    #[test]
    fn test_invalid_marker_identifier() {
        let cfg = WatchConfig {
            marker: "not valid".to_string(),
            ..WatchConfig::default()
        };
        assert!(matches!(
            FileWatcher::new("whatever.py", &cfg),
            Err(SyncError::InvalidIdentifier { .. })
        ));
    }
}
