//! # unpacker
//!
//! Unpack an archive of unknown type into a directory.
//!
//! The file name picks the format (ZIP, RAR, TAR, TAR.GZ, GZ or 7z). The source
//! and destination are checked, the destination is resolved (optionally into a
//! fresh, uniquely named subdirectory), and the matching codec does the work.
//! Every request settles exactly once: with the directory the archive landed in,
//! or with one [`Error`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = unpacker::unpack_file("files/photo.png.gz", Some(Path::new("inflated")), true).await?;
//!     println!("unpacked into {}", dir.display());
//!     Ok(())
//! }
//! ```
//!
//! Use [`Unpacker::new`] with an [`UnpackConfig`] to change integrity probing,
//! RAR stream concurrency, cleanup of partial output, or the extraction timeout.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive format detection by file name
pub mod classify;
/// Configuration types
pub mod config;
/// Destination directory resolution
pub mod destination;
/// Error types
pub mod error;
/// Format handlers
pub mod extraction;
/// Precondition checks
pub mod preconditions;
/// Single-settle result handling
pub mod settle;
/// Core types
pub mod types;
/// The unpack pipeline
pub mod unpacker;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use classify::detect_archive_format;
pub use config::UnpackConfig;
pub use destination::ResolvedDestination;
pub use error::{Error, Result};
pub use settle::{Settlement, UnpackHandle};
pub use types::{ArchiveEntry, ArchiveFormat, EntryKind, UnpackRequest};
pub use unpacker::{Unpacker, unpack_file};
