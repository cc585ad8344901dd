//! Format handlers
//!
//! Every supported format is driven through the [`ArchiveExtractor`] capability,
//! so the dispatcher never deals with codec specifics. ZIP, 7z, tarballs and
//! single gzip files have a whole-archive extract call; RAR is built on the
//! entry-level [`EntrySource`] capability instead.

mod gzip;
mod rar;
mod sevenz;
mod shared;
mod tar;
mod zip;


// Re-exports
pub use gzip::GzipExtractor;
pub use rar::{
    EntryReader, EntrySource, RarExtractor, StreamOptions, UnrarSource, create_directories,
    directory_plan, extract_entries,
};
pub use sevenz::SevenZipExtractor;
pub use tar::TarExtractor;
pub use zip::ZipExtractor;

use crate::config::UnpackConfig;
use crate::error::Result;
use crate::types::ArchiveFormat;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Whole-archive extraction capability
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Format handled by this extractor
    fn format(&self) -> ArchiveFormat;

    /// Check the archive's integrity without writing anything
    ///
    /// Formats without a cheap probe accept every archive here and report
    /// problems from [`extract_all`](ArchiveExtractor::extract_all) instead.
    async fn test(&self, _archive_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Extract the archive's full contents into `dest_path`, which must exist
    async fn extract_all(&self, archive_path: &Path, dest_path: &Path) -> Result<()>;
}

/// Select the extractor for `format`
pub fn extractor_for(format: ArchiveFormat, config: &UnpackConfig) -> Box<dyn ArchiveExtractor> {
    match format {
        ArchiveFormat::Tar => Box::new(TarExtractor::tar()),
        ArchiveFormat::TarGz => Box::new(TarExtractor::tar_gz()),
        ArchiveFormat::Gz => Box::new(GzipExtractor),
        ArchiveFormat::Zip => Box::new(ZipExtractor),
        ArchiveFormat::SevenZip => Box::new(SevenZipExtractor),
        ArchiveFormat::Rar => Box::new(RarExtractor::new(StreamOptions {
            max_concurrent_entries: config.max_concurrent_entries,
            abort_siblings_on_failure: config.abort_siblings_on_failure,
        })),
    }
}

/// Unified archive extraction dispatcher
///
/// Routes to the extractor for `format`, probing the archive first when
/// `config.test_before_extract` is set.
///
/// # Example
/// ```no_run
/// use unpacker::config::UnpackConfig;
/// use unpacker::extraction::extract_archive;
/// use unpacker::ArchiveFormat;
/// use std::path::Path;
///
/// # async fn example() -> unpacker::Result<()> {
/// extract_archive(
///     ArchiveFormat::Zip,
///     Path::new("files.zip"),
///     Path::new("/tmp/extract"),
///     &UnpackConfig::default(),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn extract_archive(
    format: ArchiveFormat,
    archive_path: &Path,
    dest_path: &Path,
    config: &UnpackConfig,
) -> Result<()> {
    let extractor = extractor_for(format, config);

    info!(
        ?archive_path,
        ?dest_path,
        format = %extractor.format(),
        "dispatching extraction to appropriate extractor"
    );

    if config.test_before_extract {
        extractor.test(archive_path).await?;
    }
    extractor.extract_all(archive_path, dest_path).await
}
