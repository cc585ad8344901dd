use crate::error::Result;
use crate::types::ArchiveFormat;
use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::ArchiveExtractor;
use super::shared::{delegate_error, io_context, run_blocking};

/// Leading bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Archive extractor for tarballs (.tar, .tar.gz, .tgz)
///
/// `.tar.gz`/`.tgz` are always gunzipped. A plain `.tar` is sniffed for the gzip
/// magic so mislabeled compressed tarballs still unpack. Every gzip member is
/// decoded, not just the first.
pub struct TarExtractor {
    format: ArchiveFormat,
}

impl TarExtractor {
    /// Extractor for `.tar` files
    pub fn tar() -> Self {
        Self {
            format: ArchiveFormat::Tar,
        }
    }

    /// Extractor for `.tar.gz` and `.tgz` files
    pub fn tar_gz() -> Self {
        Self {
            format: ArchiveFormat::TarGz,
        }
    }

    /// Decompress (if needed) and unpack the tarball into `dest_path`
    pub fn try_extract(format: ArchiveFormat, archive_path: &Path, dest_path: &Path) -> Result<()> {
        debug!(?archive_path, ?dest_path, %format, "attempting tarball extraction");

        let file =
            File::open(archive_path).map_err(|e| io_context("open tarball", archive_path, e))?;
        let mut reader = BufReader::new(file);

        let gzipped = match format {
            ArchiveFormat::TarGz => true,
            _ => reader
                .fill_buf()
                .map_err(|e| io_context("read tarball", archive_path, e))?
                .starts_with(&GZIP_MAGIC),
        };

        let stream: Box<dyn Read> = if gzipped {
            Box::new(MultiGzDecoder::new(reader))
        } else {
            Box::new(reader)
        };

        tar::Archive::new(stream)
            .unpack(dest_path)
            .map_err(|e| delegate_error(format, archive_path, e))?;

        info!(?archive_path, gzipped, "tarball extraction successful");
        Ok(())
    }
}

#[async_trait]
impl ArchiveExtractor for TarExtractor {
    fn format(&self) -> ArchiveFormat {
        self.format
    }

    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()> {
        let format = self.format;
        let archive = archive_path.to_path_buf();
        let dest = dest_path.to_path_buf();
        run_blocking(format, archive_path, move || {
            Self::try_extract(format, &archive, &dest)
        })
        .await
    }
}
