use crate::error::{Error, Result};
use crate::types::ArchiveFormat;
use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::ArchiveExtractor;
use super::shared::{delegate_error, io_context, run_blocking};

/// Extractor for single gzip-compressed files (.gz)
///
/// The output keeps the source's file name minus the `.gz` suffix, so
/// `photo.png.gz` becomes `<dest>/photo.png`.
pub struct GzipExtractor;

impl GzipExtractor {
    /// Derive the output file name from the archive's last path segment
    ///
    /// Returns `None` if the name doesn't end in `.gz` (any case) or nothing is
    /// left after removing it.
    pub fn output_name(archive_path: &Path) -> Option<String> {
        let name = archive_path.file_name()?.to_str()?;
        let cut = name.len().checked_sub(3)?;
        let (stem, suffix) = (name.get(..cut)?, name.get(cut..)?);

        if !suffix.eq_ignore_ascii_case(".gz") || stem.is_empty() {
            return None;
        }
        Some(stem.to_string())
    }

    /// Stream the archive through the gzip decoder into `dest_path`
    ///
    /// Concatenated gzip members are decoded back to back into the same file.
    pub fn try_extract(archive_path: &Path, dest_path: &Path) -> Result<()> {
        let name = Self::output_name(archive_path).ok_or_else(|| Error::Extraction {
            format: ArchiveFormat::Gz,
            archive: archive_path.to_path_buf(),
            reason: "cannot derive output file name".to_string(),
        })?;
        let out_path = dest_path.join(&name);

        debug!(?archive_path, ?out_path, "attempting GZ decompression");

        let file = File::open(archive_path).map_err(|e| io_context("open", archive_path, e))?;
        let mut decoder = MultiGzDecoder::new(BufReader::new(file));

        let out = File::create(&out_path).map_err(|e| io_context("create", &out_path, e))?;
        let mut writer = BufWriter::new(out);

        let bytes = std::io::copy(&mut decoder, &mut writer)
            .map_err(|e| delegate_error(ArchiveFormat::Gz, archive_path, e))?;
        writer
            .flush()
            .map_err(|e| io_context("write", &out_path, e))?;

        info!(?archive_path, ?out_path, bytes, "GZ decompression successful");
        Ok(())
    }
}

#[async_trait]
impl ArchiveExtractor for GzipExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Gz
    }

    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()> {
        let archive = archive_path.to_path_buf();
        let dest = dest_path.to_path_buf();
        run_blocking(ArchiveFormat::Gz, archive_path, move || {
            Self::try_extract(&archive, &dest)
        })
        .await
    }
}
