//! Core types shared by the classifier, the resolver and the format handlers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Archive format, selected from the source file name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    /// Tarball (.tar), gzip-compressed or not
    Tar,
    /// Gzip-compressed tarball (.tar.gz, .tgz)
    TarGz,
    /// Single gzip-compressed file (.gz)
    Gz,
    /// ZIP archive (.zip, .zipx)
    Zip,
    /// RAR archive (.rar)
    Rar,
    /// 7-Zip archive (.7z)
    SevenZip,
}

impl ArchiveFormat {
    /// All formats, in classification priority order
    pub const ALL: [ArchiveFormat; 6] = [
        ArchiveFormat::TarGz,
        ArchiveFormat::Tar,
        ArchiveFormat::Gz,
        ArchiveFormat::Zip,
        ArchiveFormat::Rar,
        ArchiveFormat::SevenZip,
    ];

    /// Short display name used in logs and error messages
    pub fn name(self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "TAR",
            ArchiveFormat::TarGz => "TAR.GZ",
            ArchiveFormat::Gz => "GZ",
            ArchiveFormat::Zip => "ZIP",
            ArchiveFormat::Rar => "RAR",
            ArchiveFormat::SevenZip => "7z",
        }
    }

    /// File name suffixes (lowercase, with leading dot) recognized for this format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ArchiveFormat::Tar => &[".tar"],
            ArchiveFormat::TarGz => &[".tar.gz", ".tgz"],
            ArchiveFormat::Gz => &[".gz"],
            ArchiveFormat::Zip => &[".zip", ".zipx"],
            ArchiveFormat::Rar => &[".rar"],
            ArchiveFormat::SevenZip => &[".7z"],
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of an entry listed from an archive's metadata table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with content to stream out
    File,
    /// Directory record
    Directory,
}

/// One record from an archive's entry listing
///
/// `name` is the path exactly as stored in the archive; it is sanitized only when
/// it is joined onto the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative path within the archive
    pub name: PathBuf,
    /// File or directory
    pub kind: EntryKind,
}

impl ArchiveEntry {
    /// Create a file entry
    pub fn file(name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry
    pub fn directory(name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Whether this entry is a directory record
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A single unpack invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpackRequest {
    /// Archive to unpack
    pub source: PathBuf,
    /// Directory to unpack into; `None` is rejected with `MissingDestination`
    pub destination: Option<PathBuf>,
    /// Unpack into a freshly created, uniquely named subdirectory of `destination`
    pub randomize_destination: bool,
}

impl UnpackRequest {
    /// Create a request
    pub fn new(
        source: impl AsRef<Path>,
        destination: Option<&Path>,
        randomize_destination: bool,
    ) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.map(Path::to_path_buf),
            randomize_destination,
        }
    }
}
