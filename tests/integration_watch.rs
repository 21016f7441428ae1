//! End-to-end watcher tests against the real binary.
//!
//! These rely on wall-clock polling, so they run serially.

use serial_test::serial;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant, SystemTime};

mod common;
use common::TestEnvironment;

struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_watch(env: &TestEnvironment, file: &str) -> KillOnDrop {
    let child = Command::new(assert_cmd::cargo::cargo_bin("selfsync"))
        .current_dir(env.path())
        .env("HOME", env.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(["--quiet", "--config"])
        .arg(env.config_path())
        .args(["watch", file, "--interval", "0.05"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    KillOnDrop(child)
}

fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}

fn touch_forward(path: &std::path::Path, secs: u64) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(secs))
        .unwrap();
}

/// Test that an external edit gets a hash marker and nothing more
#[test]
#[serial]
fn test_watch_stamps_after_external_edit() {
    let env = TestEnvironment::new();
    let file = env.write_file("app.py", "__version__ = 'seed'\nprint('a')\n");
    let _watcher = spawn_watch(&env, "app.py");

    // Give the watcher time to record its baseline
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(env.read_file("app.py"), "__version__ = 'seed'\nprint('a')\n");

    std::fs::write(&file, "__version__ = 'seed'\nprint('b')\n").unwrap();
    touch_forward(&file, 5);

    assert!(
        wait_for(Duration::from_secs(10), || !env.read_file("app.py").contains("'seed'")),
        "watcher did not stamp the edited file"
    );

    let stamped = env.read_file("app.py");
    let marker = stamped.lines().next().unwrap();
    assert_eq!(marker.len(), "__version__ = ''".len() + 10);
    assert!(stamped.ends_with("print('b')\n"));

    // The watcher's own write must not cause another rewrite
    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(env.read_file("app.py"), stamped);
}

/// Test that the watcher prepends a marker to a file that has none
#[test]
#[serial]
fn test_watch_prepends_marker() {
    let env = TestEnvironment::new();
    let file = env.write_file("notes.txt", "first\n");
    let _watcher = spawn_watch(&env, "notes.txt");

    std::thread::sleep(Duration::from_millis(300));
    std::fs::write(&file, "first\nsecond\n").unwrap();
    touch_forward(&file, 5);

    assert!(wait_for(Duration::from_secs(10), || env.read_file("notes.txt").starts_with("__version__ = '")));
    assert!(env.read_file("notes.txt").ends_with("'\nfirst\nsecond\n"));
}
