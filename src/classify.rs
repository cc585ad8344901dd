//! Archive format detection by file name

use crate::types::ArchiveFormat;
use std::path::Path;

/// Detect archive format by file name suffix
///
/// Suffixes are compared case-insensitively in [`ArchiveFormat::ALL`] order, so
/// `.tar.gz` is claimed by [`ArchiveFormat::TarGz`] before the bare `.gz` pattern
/// is tried. Only the last path segment is inspected.
///
/// Returns `None` for unsupported files.
pub fn detect_archive_format(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();

    ArchiveFormat::ALL
        .into_iter()
        .find(|format| format.extensions().iter().any(|ext| name.ends_with(ext)))
}

/// Check if a file has a supported archive suffix
pub fn is_supported(path: &Path) -> bool {
    detect_archive_format(path).is_some()
}
