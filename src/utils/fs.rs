//! File system helpers for mutating the tracked file.
//!
//! Every write that touches the live file goes through [`atomic_write`]:
//! the content is written to a sibling `<name>.tmp` file, synced, and then
//! renamed over the target. Readers never observe a partially written file.

use crate::constants::TEMP_SUFFIX;
use crate::core::SyncError;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Append `suffix` to the file name of `path`.
///
/// Unlike [`Path::with_extension`], the existing extension is kept:
/// `notes.txt` + `.tmp` is `notes.txt.tmp`.
#[must_use]
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Atomically replace the contents of `path` with `content`.
///
/// # Errors
///
/// Returns [`SyncError::LocalIo`] if the temporary file cannot be created,
/// written, synced, or renamed. The temporary file is removed on failure and
/// the target is left as it was.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    let temp_path = sibling_path(path, TEMP_SUFFIX);

    let result = write_synced(&temp_path, content).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| SyncError::local_io("rename temp file over", path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_synced(temp_path: &Path, content: &[u8]) -> Result<(), SyncError> {
    let mut file = fs::File::create(temp_path)
        .map_err(|e| SyncError::local_io("create temp file", temp_path, e))?;

    file.write_all(content).map_err(|e| SyncError::local_io("write temp file", temp_path, e))?;
    file.sync_all().map_err(|e| SyncError::local_io("sync temp file", temp_path, e))?;

    Ok(())
}

/// Modification time of `path`.
///
/// # Errors
///
/// Returns [`SyncError::LocalIo`] if the metadata cannot be read or the
/// platform does not record modification times.
pub fn modified_time(path: &Path) -> Result<SystemTime, SyncError> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SyncError::local_io("read modification time of", path, e))
}
