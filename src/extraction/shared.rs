use crate::error::{Error, Result};
use crate::types::ArchiveFormat;
use std::fmt::Display;
use std::path::Path;
use tokio::task::spawn_blocking;

/// Run a blocking codec call on the blocking thread pool.
///
/// A panic inside `f` is reported as an extraction failure for `archive_path`
/// instead of tearing down the request.
pub(crate) async fn run_blocking<T, F>(
    format: ArchiveFormat,
    archive_path: &Path,
    f: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f).await.map_err(|e| Error::Extraction {
        format,
        archive: archive_path.to_path_buf(),
        reason: format!("extraction task panicked: {}", e),
    })?
}

/// Wrap a codec error for `archive_path`.
///
/// Codecs that fail without any description get the generic placeholder text, so
/// the reason is never empty.
pub(crate) fn delegate_error(format: ArchiveFormat, archive_path: &Path, e: impl Display) -> Error {
    let reason = e.to_string();
    Error::Extraction {
        format,
        archive: archive_path.to_path_buf(),
        reason: if reason.trim().is_empty() {
            "Unknown error.".to_string()
        } else {
            reason
        },
    }
}

/// Wrap an I/O error with a short description of what was being done.
pub(crate) fn io_context(what: &str, path: &Path, e: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("failed to {} {}: {}", what, path.display(), e),
    ))
}
