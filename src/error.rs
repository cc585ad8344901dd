//! Error types for unpacker
//!
//! Every unpack request settles with either a destination path or one [`Error`].
//! The variants fall into three groups:
//! - Input validation errors raised before any extraction starts
//!   ([`Error::MissingDestination`], [`Error::SourceNotFound`],
//!   [`Error::DestinationNotWritable`], [`Error::UnsupportedFormat`])
//! - Delegate errors reported by a codec or the filesystem ([`Error::Extraction`], [`Error::Io`])
//! - Placeholders for requests that ended without a usable cause ([`Error::Timeout`],
//!   [`Error::Unknown`])

use crate::types::ArchiveFormat;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for unpacker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unpacker
#[derive(Debug, Error)]
pub enum Error {
    /// No destination directory was given
    #[error("no output path given")]
    MissingDestination,

    /// The archive to unpack does not exist
    #[error("input file not found: {}", path.display())]
    SourceNotFound {
        /// The archive path that was requested
        path: PathBuf,
    },

    /// The destination directory is missing or not readable and writable
    #[error("cannot write in output folder: {}", path.display())]
    DestinationNotWritable {
        /// The destination directory that failed the check
        path: PathBuf,
    },

    /// The archive's file name matches none of the supported formats
    #[error("file type not supported: {}", path.display())]
    UnsupportedFormat {
        /// The archive path that could not be classified
        path: PathBuf,
    },

    /// The codec for `format` rejected the archive (corrupt, truncated, not an archive, ...)
    #[error("{format} extraction failed for {}: {reason}", archive.display())]
    Extraction {
        /// Format of the handler that failed
        format: ArchiveFormat,
        /// The archive that failed to extract
        archive: PathBuf,
        /// The delegate's description of the failure
        reason: String,
    },

    /// I/O error while creating directories or writing extracted files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Extraction did not finish within the configured timeout
    #[error("extraction timed out after {}s", after.as_secs_f64())]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_entries")
        key: Option<String>,
    },

    /// The request failed without the delegate giving a reason
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Machine-readable error code
    ///
    /// Codes are stable across releases and are suitable for matching by callers
    /// that only see the error as text (logs, bindings, JSON reports).
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingDestination => "missing_destination",
            Error::SourceNotFound { .. } => "source_not_found",
            Error::DestinationNotWritable { .. } => "destination_not_writable",
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::Extraction { .. } => "extraction_failed",
            Error::Io(_) => "io_error",
            Error::Timeout { .. } => "timeout",
            Error::Config { .. } => "config_error",
            Error::Unknown(_) => "unknown",
        }
    }

    /// Whether the error was raised by input validation, before any extraction started
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingDestination
                | Error::SourceNotFound { .. }
                | Error::DestinationNotWritable { .. }
                | Error::UnsupportedFormat { .. }
        )
    }

    /// Placeholder used when a request ends without a cause
    pub(crate) fn unknown() -> Self {
        Error::Unknown("Unknown error.".to_string())
    }
}
