use crate::error::Result;
use crate::types::ArchiveFormat;
use crate::utils::sanitize_entry_name;
use async_trait::async_trait;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::ArchiveExtractor;
use super::shared::{delegate_error, run_blocking};

/// Archive extractor for 7z files
pub struct SevenZipExtractor;

impl SevenZipExtractor {
    /// Open the archive and parse its headers
    pub fn try_test(archive_path: &Path) -> Result<()> {
        debug!(?archive_path, "testing 7z archive");

        sevenz_rust::SevenZReader::open(archive_path, sevenz_rust::Password::empty())
            .map(|_| ())
            .map_err(|e| delegate_error(ArchiveFormat::SevenZip, archive_path, e))
    }

    /// Extract the whole archive into `dest_path`
    ///
    /// Each entry name is reduced to its normal components before anything is
    /// written, so `../escaped.txt` lands at `<dest>/escaped.txt`. Entries with
    /// no usable name are skipped.
    pub fn try_extract(archive_path: &Path, dest_path: &Path) -> Result<()> {
        debug!(?archive_path, ?dest_path, "attempting 7z extraction");

        let mut extracted_count = 0usize;
        sevenz_rust::decompress_file_with_extract_fn(
            archive_path,
            dest_path,
            |entry: &sevenz_rust::SevenZArchiveEntry,
             reader: &mut dyn Read,
             _joined: &PathBuf|
             -> std::result::Result<bool, sevenz_rust::Error> {
                let Some(relative) = sanitize_entry_name(Path::new(&entry.name)) else {
                    warn!(name = %entry.name, "skipping 7z entry with unsafe path");
                    return Ok(true);
                };
                let target = dest_path.join(relative);

                write_entry(entry.is_directory, reader, &target).map_err(|e| {
                    sevenz_rust::Error::Other(
                        format!("failed to write {}: {}", target.display(), e).into(),
                    )
                })?;
                if !entry.is_directory {
                    extracted_count += 1;
                }
                Ok(true)
            },
        )
        .map_err(|e| delegate_error(ArchiveFormat::SevenZip, archive_path, e))?;

        info!(?archive_path, extracted_count, "7z extraction successful");
        Ok(())
    }
}

/// Materialize one entry at `target`, creating missing parents
fn write_entry(is_directory: bool, reader: &mut dyn Read, target: &Path) -> std::io::Result<()> {
    if is_directory {
        return std::fs::create_dir_all(target);
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(target)?);
    std::io::copy(reader, &mut writer)?;
    writer.flush()
}

#[async_trait]
impl ArchiveExtractor for SevenZipExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::SevenZip
    }

    async fn test(&self, archive_path: &Path) -> Result<()> {
        let archive = archive_path.to_path_buf();
        run_blocking(ArchiveFormat::SevenZip, archive_path, move || {
            Self::try_test(&archive)
        })
        .await
    }

    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()> {
        let archive = archive_path.to_path_buf();
        let dest = dest_path.to_path_buf();
        run_blocking(ArchiveFormat::SevenZip, archive_path, move || {
            Self::try_extract(&archive, &dest)
        })
        .await
    }
}
