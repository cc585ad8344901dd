use crate::error::Result;
use crate::types::ArchiveFormat;
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use super::ArchiveExtractor;
use super::shared::{delegate_error, io_context, run_blocking};

/// Archive extractor for ZIP files (.zip, .zipx)
pub struct ZipExtractor;

impl ZipExtractor {
    /// Open a ZIP archive, reading its central directory
    fn open(archive_path: &Path) -> Result<zip::ZipArchive<File>> {
        let file = File::open(archive_path)
            .map_err(|e| io_context("open ZIP archive", archive_path, e))?;

        zip::ZipArchive::new(file).map_err(|e| delegate_error(ArchiveFormat::Zip, archive_path, e))
    }

    /// Read every entry to the end so the codec checks its CRC
    pub fn try_test(archive_path: &Path) -> Result<()> {
        debug!(?archive_path, "testing ZIP archive");

        let mut archive = Self::open(archive_path)?;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| delegate_error(ArchiveFormat::Zip, archive_path, e))?;
            std::io::copy(&mut entry, &mut std::io::sink())
                .map_err(|e| delegate_error(ArchiveFormat::Zip, archive_path, e))?;
        }

        Ok(())
    }

    /// Extract the whole archive into `dest_path`
    ///
    /// Entry names that would escape `dest_path` are rejected by the codec.
    pub fn try_extract(archive_path: &Path, dest_path: &Path) -> Result<()> {
        debug!(?archive_path, ?dest_path, "attempting ZIP extraction");

        let mut archive = Self::open(archive_path)?;
        let entry_count = archive.len();

        archive
            .extract(dest_path)
            .map_err(|e| delegate_error(ArchiveFormat::Zip, archive_path, e))?;

        info!(?archive_path, entry_count, "ZIP extraction successful");
        Ok(())
    }
}

#[async_trait]
impl ArchiveExtractor for ZipExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    async fn test(&self, archive_path: &Path) -> Result<()> {
        let archive = archive_path.to_path_buf();
        run_blocking(ArchiveFormat::Zip, archive_path, move || {
            Self::try_test(&archive)
        })
        .await
    }

    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()> {
        let archive = archive_path.to_path_buf();
        let dest = dest_path.to_path_buf();
        run_blocking(ArchiveFormat::Zip, archive_path, move || {
            Self::try_extract(&archive, &dest)
        })
        .await
    }
}
