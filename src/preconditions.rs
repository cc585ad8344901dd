//! Precondition checks run before any extraction

use crate::error::{Error, Result};
use crate::types::UnpackRequest;
use crate::utils::is_readable_writable_dir;
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::debug;

/// Validate an unpack request
///
/// Checks run in order and stop at the first failure:
/// 1. a destination was given (no filesystem access)
/// 2. the source exists
/// 3. the destination is a directory the process can read and write
///
/// Returns the destination path on success.
pub async fn check_preconditions(request: &UnpackRequest) -> Result<&Path> {
    let destination = match request.destination.as_deref() {
        Some(dest) if !dest.as_os_str().is_empty() => dest,
        _ => return Err(Error::MissingDestination),
    };

    if !tokio::fs::try_exists(&request.source)
        .await
        .unwrap_or(false)
    {
        debug!(source = ?request.source, "source archive does not exist");
        return Err(Error::SourceNotFound {
            path: request.source.clone(),
        });
    }

    let probe = destination.to_path_buf();
    let writable = spawn_blocking(move || is_readable_writable_dir(&probe))
        .await
        .unwrap_or(false);
    if !writable {
        debug!(?destination, "destination is not a writable directory");
        return Err(Error::DestinationNotWritable {
            path: destination.to_path_buf(),
        });
    }

    Ok(destination)
}
