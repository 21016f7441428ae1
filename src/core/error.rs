//! Error handling for selfsync.
//!
//! The error system is split in two layers:
//!
//! - [`SyncError`] - the typed error kinds produced by the library
//!   (network lookups, local file mutations, the watcher loop, configuration)
//! - [`ErrorContext`] - a display wrapper adding details and a suggestion,
//!   built from any `anyhow::Error` by [`user_friendly_error`]
//!
//! Library functions return `Result<T, SyncError>` where callers need to tell
//! the kinds apart; the CLI layer works with `anyhow::Result` and adds context
//! with `.context(...)`.
//!
//! # Non-fatal kinds
//!
//! Not every error ends the process:
//!
//! - [`SyncError::NetworkUnavailable`] for a single candidate only moves the
//!   update search on to the next candidate
//! - [`SyncError::NotFound`] is reported to the user as an outcome of a check
//! - [`SyncError::WatcherTick`] and any other error raised during a watcher
//!   tick are logged and the loop keeps polling

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Typed error kinds produced by selfsync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Fetching one remote candidate failed (transport error or non-success
    /// HTTP status).
    #[error("Failed to fetch {url}: {reason}")]
    NetworkUnavailable {
        /// The URL that was requested
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// No candidate location held a remote copy of the file.
    #[error("No matching file found for {filename} in repository {repo}")]
    NotFound {
        /// Repository identifier (`owner/name`)
        repo: String,
        /// Local file name the search started from
        filename: String,
    },

    /// Reading, writing, or renaming a local file failed.
    #[error("Failed to {operation} {}", path.display())]
    LocalIo {
        /// What was being done ("read", "rename", "write temp file for", ...)
        operation: &'static str,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A watcher tick failed for a reason other than local I/O.
    #[error("Watcher tick failed: {reason}")]
    WatcherTick {
        /// Description of the failure
        reason: String,
    },

    /// A marker value would break the quoted assignment it is written into.
    #[error("Invalid marker value {value:?}: quotes and line breaks are not allowed")]
    InvalidMarker {
        /// The rejected value
        value: String,
    },

    /// A marker identifier is empty or not a plain identifier.
    #[error("Invalid marker identifier {ident:?}")]
    InvalidIdentifier {
        /// The rejected identifier
        ident: String,
    },

    /// Rollback was requested but no backup exists.
    #[error("No backup found for {}", path.display())]
    NoBackup {
        /// The tracked file whose backups were searched
        path: PathBuf,
    },

    /// The configuration file could not be loaded or holds invalid values.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigError {
        /// Configuration file path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}

impl SyncError {
    /// Shorthand for building a [`SyncError::LocalIo`].
    pub fn local_io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::LocalIo {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether an update search may continue past this error.
    #[must_use]
    pub const fn is_candidate_failure(&self) -> bool {
        matches!(self, Self::NetworkUnavailable { .. })
    }
}

/// An error message with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The primary error message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for terminal output.
///
/// Known [`SyncError`] kinds anywhere in the chain get a tailored suggestion.
/// Everything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format_chain(&error);

    if let Some(sync_error) = error.chain().find_map(|e| e.downcast_ref::<SyncError>()) {
        return create_error_context(sync_error, message);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(message)
            .with_suggestion("Check the ownership and permissions of the tracked file and its directory");
    }

    ErrorContext::new(message)
}

fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(error: &SyncError, message: String) -> ErrorContext {
    match error {
        SyncError::NetworkUnavailable { .. } => ErrorContext::new(message)
            .with_suggestion("Check your internet connection and the configured remote host")
            .with_details("Each branch and filename variant is fetched with a fixed timeout"),

        SyncError::NotFound { repo, .. } => ErrorContext::new(message)
            .with_suggestion(format!(
                "Verify that {repo} is public and contains the file on one of the configured branches"
            )),

        SyncError::LocalIo { path, .. } => ErrorContext::new(message)
            .with_suggestion(format!(
                "Check that {} exists and its directory is writable",
                path.display()
            ))
            .with_details("Writes go through a sibling .tmp file, so the original is left untouched on failure"),

        SyncError::WatcherTick { .. } => ErrorContext::new(message)
            .with_details("The watcher keeps polling after a failed tick"),

        SyncError::InvalidMarker { .. } => ErrorContext::new(message)
            .with_suggestion("Use a value made of letters, digits, dots, dashes, or underscores"),

        SyncError::InvalidIdentifier { .. } => ErrorContext::new(message)
            .with_suggestion("Set watch.marker to a plain identifier such as __version__"),

        SyncError::NoBackup { path } => ErrorContext::new(message).with_suggestion(format!(
            "Backups are created as {}.backup.<timestamp> when an update is applied",
            path.display()
        )),

        SyncError::ConfigError { path, .. } => ErrorContext::new(message).with_suggestion(format!(
            "Fix or remove {} and try again",
            path.display()
        )),
    }
}
