//! Error types for ytdlp-frontend
//!
//! This module provides the error taxonomy of the library:
//! - [`ValidationError`] - rejected before anything is spawned
//! - [`ProcessError`] - the external tool failed to start, exited non-zero or crashed
//! - [`ResolutionError`] - ordinal positions could not be turned into item URLs
//! - [`DatabaseError`] - the bookmark store failed (never fatal to the core)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ytdlp-frontend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytdlp-frontend
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tools.ytdlp_path")
        key: Option<String>,
    },

    /// A job was rejected before anything was spawned
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The external tool failed
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// Selected positions could not be resolved to item URLs
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// Duplicate record (e.g. a bookmark for a URL that is already bookmarked)
    #[error("duplicate: {0}")]
    Duplicate(String),
}

impl Error {
    /// Stable machine-readable category, suitable for display sinks and logs
    pub fn category(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config",
            Error::Validation(_) => "validation",
            Error::Process(_) => "process",
            Error::Resolution(_) => "resolution",
            Error::Database(_) => "persistence",
            Error::Io(_) => "io",
            Error::ShuttingDown => "shutting_down",
            Error::Duplicate(_) => "duplicate",
        }
    }
}

/// Preconditions that must hold before a job may start
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The URL field is empty
    #[error("no URLs entered")]
    EmptyUrls,

    /// No output directory was chosen
    #[error("no output directory selected")]
    MissingOutputDir,

    /// The output directory does not exist
    #[error("output directory does not exist: {}", path.display())]
    OutputDirNotFound {
        /// The configured output directory
        path: PathBuf,
    },

    /// The effective output directory cannot be written to
    #[error("output directory is not writable: {}", path.display())]
    OutputDirNotWritable {
        /// The effective output directory
        path: PathBuf,
    },

    /// The configured subdirectory could not be created
    #[error("failed to create subdirectory {}: {reason}", path.display())]
    OutputDirCreateFailed {
        /// The subdirectory that could not be created
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Selection mode is active but no positions are selected
    #[error("selection mode is active but no items are selected")]
    EmptySelection,

    /// A bookmark must have a name
    #[error("bookmark name cannot be empty")]
    EmptyBookmarkName,

    /// The URL is not a channel address
    #[error("not a channel URL: {url}")]
    InvalidChannelUrl {
        /// The rejected URL
        url: String,
    },

    /// The URL is not a playlist address
    #[error("not a playlist URL: {url}")]
    InvalidPlaylistUrl {
        /// The rejected URL
        url: String,
    },

    /// A channel address was given where a playlist was expected
    #[error("channel URLs cannot be listed as playlists, use channel listing instead: {url}")]
    ChannelUrlInPlaylistListing {
        /// The rejected URL
        url: String,
    },

    /// A main download job is already active
    #[error("a download is already running")]
    JobAlreadyRunning,
}

/// Failures of the external tool
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The process could not be spawned
    #[error("failed to start {program}: {reason}")]
    SpawnFailed {
        /// Program that was invoked
        program: String,
        /// Underlying failure
        reason: String,
    },

    /// The process exited with a non-zero status
    #[error("process exited with code {code}")]
    NonZeroExit {
        /// Exit code reported by the OS
        code: i32,
    },

    /// The process was terminated without an exit code (signal, crash)
    #[error("process crashed")]
    Crashed,

    /// A standard stream was not captured
    #[error("{0} was not captured")]
    MissingPipe(&'static str),
}

/// Failures turning ordinal positions into item URLs
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Every listing attempt failed
    #[error("URL listing failed after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },

    /// The listing succeeded but none of the requested positions exist in it
    #[error("none of the {requested} selected items exist in a listing of {available}")]
    NoValidItems {
        /// Number of positions requested
        requested: usize,
        /// Number of items the listing returned
        available: usize,
    },
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_cover_the_taxonomy() {
        let cases: Vec<(Error, &str)> = vec![
            (ValidationError::EmptyUrls.into(), "validation"),
            (ProcessError::NonZeroExit { code: 1 }.into(), "process"),
            (ProcessError::Crashed.into(), "process"),
            (
                ResolutionError::Exhausted {
                    attempts: 3,
                    last_error: "exit 1".into(),
                }
                .into(),
                "resolution",
            ),
            (
                DatabaseError::ConnectionFailed("locked".into()).into(),
                "persistence",
            ),
            (Error::Duplicate("https://x".into()), "duplicate"),
            (Error::ShuttingDown, "shutting_down"),
            (
                Error::Config {
                    message: "no option file path".into(),
                    key: None,
                },
                "config",
            ),
            (std::io::Error::other("disk full").into(), "io"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected, "{error}");
        }
    }

    #[test]
    fn messages_carry_context() {
        let err = Error::from(ValidationError::OutputDirNotFound {
            path: PathBuf::from("/nope"),
        });
        assert_eq!(
            err.to_string(),
            "validation error: output directory does not exist: /nope"
        );

        let err = Error::from(ResolutionError::NoValidItems {
            requested: 2,
            available: 1,
        });
        assert!(err.to_string().contains("none of the 2 selected items"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.category(), "io");
    }
}
