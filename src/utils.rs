//! Utility functions for filesystem probes and path manipulation

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Check whether `path` is a directory the current process can read and write
///
/// On unix this asks the kernel via `access(2)` with `R_OK | W_OK`, which honors
/// ACLs and effective ids. Elsewhere it falls back to the read-only attribute.
///
/// Returns `false` for missing paths and for paths that are not directories.
pub fn is_readable_writable_dir(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => has_read_write_access(path, &meta),
        _ => false,
    }
}

#[cfg(unix)]
fn has_read_write_access(path: &Path, _meta: &std::fs::Metadata) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };

    // SAFETY: c_path is a valid, null-terminated C string that outlives the call,
    // and access(2) only reads it.
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn has_read_write_access(_path: &Path, meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

/// Return `path` with exactly one trailing separator
///
/// Redundant separators and `.` segments are dropped along the way, so
/// `out//` and `out/./` both become `out/`.
///
/// # Examples
///
/// ```
/// use unpacker::utils::with_trailing_separator;
/// use std::path::Path;
///
/// let dir = with_trailing_separator(Path::new("out//"));
/// assert_eq!(dir.to_string_lossy(), format!("out{}", std::path::MAIN_SEPARATOR));
/// ```
pub fn with_trailing_separator(path: &Path) -> PathBuf {
    let normalized: PathBuf = path.components().collect();
    let mut os: OsString = normalized.into_os_string();
    if os.is_empty() {
        os.push(".");
    }

    let ends_with_separator = os
        .as_encoded_bytes()
        .last()
        .is_some_and(|b| std::path::is_separator(char::from(*b)));
    if !ends_with_separator {
        os.push(std::path::MAIN_SEPARATOR_STR);
    }

    PathBuf::from(os)
}

/// Reduce an archive entry name to its normal components
///
/// Root, prefix, `.` and `..` components are dropped to prevent path traversal
/// (e.g. `../../../etc/passwd` becomes `etc/passwd`). Returns `None` when nothing
/// is left.
pub fn sanitize_entry_name(name: &Path) -> Option<PathBuf> {
    let sanitized = name
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect::<PathBuf>();

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
