//! Core types shared by every selfsync module.
//!
//! Currently this is the error system: the typed [`SyncError`] kinds and the
//! [`ErrorContext`] wrapper used to present errors on the command line.

pub mod error;

pub use error::{ErrorContext, SyncError, user_friendly_error};
