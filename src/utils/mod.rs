//! Utility helpers shared across modules.
//!
//! - [`fs`] - atomic write-then-rename, sibling path construction, and
//!   modification time lookup

pub mod fs;

pub use fs::{atomic_write, modified_time, sibling_path};
