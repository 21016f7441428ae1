use crate::constants::{HASH_CHUNK_SIZE, SHORT_HASH_LEN};
use crate::core::SyncError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Computes and compares SHA-256 content hashes.
///
/// Hashes are rendered as lowercase hex. The first [`SHORT_HASH_LEN`]
/// characters of a file hash form the version marker the watcher stamps into
/// the file.
pub struct ContentHasher;

impl ContentHasher {
    /// Hex-encoded SHA-256 of `bytes`.
    #[must_use]
    pub fn hash_bytes(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    /// Hex-encoded SHA-256 of the file at `path`, read in fixed-size chunks.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LocalIo`] if the file cannot be opened or read.
    pub fn hash_file(path: &Path) -> Result<String, SyncError> {
        debug!("Computing SHA-256 for {}", path.display());

        let mut file = File::open(path).map_err(|e| SyncError::local_io("open", path, e))?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; HASH_CHUNK_SIZE];

        loop {
            let read = file.read(&mut buffer).map_err(|e| SyncError::local_io("read", path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Leading characters of a hex hash used as a marker value.
    ///
    /// Input that cannot be cut on a character boundary is returned whole.
    #[must_use]
    pub fn short(hash: &str) -> &str {
        hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
    }

    /// Whether two byte strings have the same content hash.
    #[must_use]
    pub fn same_content(a: &[u8], b: &[u8]) -> bool {
        Self::hash_bytes(a) == Self::hash_bytes(b)
    }
}
