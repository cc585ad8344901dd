use crate::error::{Error, Result};
use crate::types::{ArchiveEntry, ArchiveFormat, EntryKind};
use crate::utils::sanitize_entry_name;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::ArchiveExtractor;
use super::shared::{delegate_error, io_context, run_blocking};

/// Byte stream for one archive entry
pub type EntryReader = Box<dyn AsyncRead + Send + Unpin>;

/// Entry-level access to an archive that has no one-call "extract all"
///
/// Implementations list the archive's metadata table and open individual entries
/// by the name reported in that listing.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// List every entry in the archive
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>>;

    /// Open the content of the file entry called `name`
    async fn open_entry(&self, name: &Path) -> Result<EntryReader>;

    /// Write the file entry called `name` to `target`, returning the bytes written
    ///
    /// The default streams [`open_entry`](EntrySource::open_entry) into the file.
    /// Sources whose codec can write to disk directly override this.
    async fn unpack_entry(&self, name: &Path, target: &Path) -> Result<u64> {
        let mut reader = self.open_entry(name).await?;
        let mut file = tokio::fs::File::create(target)
            .await
            .map_err(|e| io_context("create output file", target, e))?;

        let bytes = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| io_context("write", target, e))?;
        file.flush()
            .await
            .map_err(|e| io_context("flush", target, e))?;

        Ok(bytes)
    }
}

/// [`EntrySource`] backed by the unrar library
pub struct UnrarSource {
    archive_path: PathBuf,
}

impl UnrarSource {
    /// Create a source for the RAR archive at `archive_path`
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
        }
    }

    fn rar_error(e: unrar::error::UnrarError, archive_path: &Path) -> Error {
        delegate_error(ArchiveFormat::Rar, archive_path, e)
    }

    /// List entry headers using unrar's listing mode
    pub fn try_list(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
        let listing = unrar::Archive::new(archive_path)
            .open_for_listing()
            .map_err(|e| Self::rar_error(e, archive_path))?;

        let mut entries = Vec::new();
        for header in listing {
            let header = header.map_err(|e| Self::rar_error(e, archive_path))?;
            let kind = if header.is_directory() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(ArchiveEntry {
                name: header.filename,
                kind,
            });
        }

        Ok(entries)
    }

    /// Skip headers until the entry called `name`, then read or extract it
    ///
    /// Returns the entry's bytes for [`EntryOutput::Memory`] and `None` once the
    /// codec has written it for [`EntryOutput::File`].
    fn process_entry(
        archive_path: &Path,
        name: &Path,
        output: EntryOutput<'_>,
    ) -> Result<Option<Vec<u8>>> {
        let mut at_header = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| Self::rar_error(e, archive_path))?;

        while let Some(at_file) = at_header
            .read_header()
            .map_err(|e| Self::rar_error(e, archive_path))?
        {
            if at_file.entry().filename == name {
                let processed = match output {
                    EntryOutput::Memory => at_file.read().map(|(data, _)| Some(data)),
                    EntryOutput::File(target) => at_file.extract_to(target).map(|_| None),
                };
                return processed.map_err(|e| Self::rar_error(e, archive_path));
            }
            at_header = at_file
                .skip()
                .map_err(|e| Self::rar_error(e, archive_path))?;
        }

        Err(Error::Extraction {
            format: ArchiveFormat::Rar,
            archive: archive_path.to_path_buf(),
            reason: format!("entry {} not found in archive", name.display()),
        })
    }

    /// Read one entry's bytes into memory
    pub fn try_read(archive_path: &Path, name: &Path) -> Result<Vec<u8>> {
        Self::process_entry(archive_path, name, EntryOutput::Memory)
            .map(Option::unwrap_or_default)
    }

    /// Let the codec write one entry straight to `target`
    pub fn try_extract_entry(archive_path: &Path, name: &Path, target: &Path) -> Result<u64> {
        Self::process_entry(archive_path, name, EntryOutput::File(target))?;

        std::fs::metadata(target)
            .map(|meta| meta.len())
            .map_err(|e| io_context("inspect", target, e))
    }
}

/// Where [`UnrarSource::process_entry`] puts an entry's content
enum EntryOutput<'a> {
    Memory,
    File(&'a Path),
}

#[async_trait]
impl EntrySource for UnrarSource {
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let archive = self.archive_path.clone();
        run_blocking(ArchiveFormat::Rar, &self.archive_path, move || {
            Self::try_list(&archive)
        })
        .await
    }

    /// Buffers the whole entry; [`unpack_entry`](EntrySource::unpack_entry) does not
    async fn open_entry(&self, name: &Path) -> Result<EntryReader> {
        let archive = self.archive_path.clone();
        let name = name.to_path_buf();
        let data = run_blocking(ArchiveFormat::Rar, &self.archive_path, move || {
            Self::try_read(&archive, &name)
        })
        .await?;
        Ok(Box::new(Cursor::new(data)))
    }

    async fn unpack_entry(&self, name: &Path, target: &Path) -> Result<u64> {
        let archive = self.archive_path.clone();
        let name = name.to_path_buf();
        let target = target.to_path_buf();
        run_blocking(ArchiveFormat::Rar, &self.archive_path, move || {
            Self::try_extract_entry(&archive, &name, &target)
        })
        .await
    }
}

/// Build the ordered list of directories to create before streaming files
///
/// Every directory entry, and the parent of every file entry, is expanded into
/// all of its ancestor prefixes (`a/b/c` → `a`, `a/b`, `a/b/c`). Each prefix
/// appears once, and the list is sorted by depth so parents always precede
/// their children.
pub fn directory_plan(entries: &[ArchiveEntry]) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();

    for entry in entries {
        let Some(path) = sanitize_entry_name(&entry.name) else {
            continue;
        };
        let dir = match entry.kind {
            EntryKind::Directory => Some(path.as_path()),
            EntryKind::File => path.parent(),
        };

        if let Some(dir) = dir {
            let mut prefix = PathBuf::new();
            for component in dir.components() {
                prefix.push(component);
                dirs.insert(prefix.clone());
            }
        }
    }

    // Stable sort keeps the BTreeSet's lexicographic order within a depth
    let mut plan: Vec<PathBuf> = dirs.into_iter().collect();
    plan.sort_by_key(|p| p.components().count());
    plan
}

/// Create `plan` under `dest_path` one directory at a time
///
/// Stops at the first failure. A directory that already exists is accepted.
pub async fn create_directories(dest_path: &Path, plan: &[PathBuf]) -> Result<()> {
    for dir in plan {
        let target = dest_path.join(dir);
        match tokio::fs::create_dir(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && target.is_dir() => {}
            Err(e) => return Err(io_context("create directory", &target, e)),
        }
    }
    Ok(())
}

/// Options for the concurrent entry-streaming phase
#[derive(Clone, Copy, Debug)]
pub struct StreamOptions {
    /// Maximum number of entries streamed at once
    pub max_concurrent_entries: usize,
    /// Cancel in-flight streams after the first failure
    pub abort_siblings_on_failure: bool,
}

/// Unpack every entry of `source` under `dest_path`
///
/// All directories are created, serially, before the first file stream starts.
/// Files are then streamed concurrently with no ordering between them. The
/// first stream error is returned once every stream has finished (or, with
/// `abort_siblings_on_failure`, once the remaining streams have been cancelled).
pub async fn extract_entries(
    source: Arc<dyn EntrySource>,
    dest_path: &Path,
    options: StreamOptions,
) -> Result<()> {
    let entries = source.list_entries().await?;
    let (dir_entries, file_entries): (Vec<_>, Vec<_>) =
        entries.iter().partition(|e| e.is_directory());

    let plan = directory_plan(&entries);
    debug!(
        ?dest_path,
        directories = plan.len(),
        directory_entries = dir_entries.len(),
        files = file_entries.len(),
        "creating directory tree"
    );
    create_directories(dest_path, &plan).await?;

    let permits = Arc::new(Semaphore::new(options.max_concurrent_entries.max(1)));
    let mut streams = JoinSet::new();

    for entry in file_entries {
        let Some(relative) = sanitize_entry_name(&entry.name) else {
            warn!(name = ?entry.name, "skipping entry with unsafe path");
            continue;
        };
        let target = dest_path.join(relative);
        let name = entry.name.clone();
        let source = Arc::clone(&source);
        let permits = Arc::clone(&permits);

        streams.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::Unknown(format!("entry stream limiter closed: {}", e)))?;
            source
                .unpack_entry(&name, &target)
                .await
                .map(|bytes| (name, bytes))
        });
    }

    let mut streamed = 0usize;
    let mut first_error = None;

    while let Some(joined) = streams.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => continue,
            Err(e) => Err(Error::Unknown(format!("entry stream task failed: {}", e))),
        };

        match outcome {
            Ok((name, bytes)) => {
                streamed += 1;
                debug!(?name, bytes, "streamed entry");
            }
            Err(e) => {
                warn!(error = %e, ?dest_path, "entry stream failed");
                if first_error.is_none() {
                    first_error = Some(e);
                    if options.abort_siblings_on_failure {
                        streams.abort_all();
                    }
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!(?dest_path, streamed, "entry extraction successful");
            Ok(())
        }
    }
}

/// Archive extractor for RAR files
///
/// RAR has no whole-archive extract call here, so the directory tree is rebuilt
/// from the entry listing and each file is streamed out individually.
pub struct RarExtractor {
    options: StreamOptions,
}

impl RarExtractor {
    /// Create an extractor with the given streaming options
    pub fn new(options: StreamOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ArchiveExtractor for RarExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Rar
    }

    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()> {
        debug!(?archive_path, ?dest_path, "attempting RAR extraction");
        let source: Arc<dyn EntrySource> = Arc::new(UnrarSource::new(archive_path));
        extract_entries(source, dest_path, self.options).await
    }
}
