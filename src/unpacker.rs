//! The unpack pipeline: validate → classify → resolve destination → extract → settle

use crate::classify::detect_archive_format;
use crate::config::UnpackConfig;
use crate::destination::{ResolvedDestination, resolve_destination};
use crate::error::{Error, Result};
use crate::extraction::extract_archive;
use crate::preconditions::check_preconditions;
use crate::settle::{Settle, UnpackHandle};
use crate::types::{ArchiveFormat, UnpackRequest};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Unpacks archives of any supported format into a directory
///
/// Cheap to clone; clones share the same configuration.
///
/// # Example
///
/// ```no_run
/// use unpacker::Unpacker;
/// use std::path::Path;
///
/// # async fn example() -> unpacker::Result<()> {
/// let unpacker = Unpacker::default();
/// let dir = unpacker
///     .unpack_file("downloads/files.tar.gz", Some(Path::new("inflated")), true)
///     .await?;
/// println!("unpacked into {}", dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Unpacker {
    config: Arc<UnpackConfig>,
}

impl Unpacker {
    /// Create an unpacker after validating `config`
    pub fn new(config: UnpackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &UnpackConfig {
        &self.config
    }

    /// Start unpacking `source` into `destination`
    ///
    /// Returns immediately with a handle that settles exactly once, with the
    /// resolved destination directory or the first error. With
    /// `randomize_destination` the archive lands in a new, uniquely named
    /// subdirectory of `destination`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn unpack_file(
        &self,
        source: impl AsRef<Path>,
        destination: Option<&Path>,
        randomize_destination: bool,
    ) -> UnpackHandle {
        let request = UnpackRequest::new(source, destination, randomize_destination);
        let (settle, mut handle) = Settle::pending();
        let unpacker = self.clone();

        let task = tokio::spawn(async move {
            let outcome = unpacker.unpack(&request).await;
            let settlement = settle.settle(outcome);
            debug!(source = ?request.source, ?settlement, "unpack request settled");
        });
        handle.attach(task);
        handle
    }

    /// Run the full pipeline for `request` on the current task
    pub async fn unpack(&self, request: &UnpackRequest) -> Result<PathBuf> {
        let (format, destination) = match self.prepare(request).await {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!(source = ?request.source, error = %e, "unpack request rejected");
                return Err(e);
            }
        };

        let outcome = with_timeout(
            self.config.timeout,
            extract_archive(format, &request.source, destination.path(), &self.config),
        )
        .await;

        match outcome {
            Ok(()) => {
                info!(
                    source = ?request.source,
                    destination = ?destination.path(),
                    %format,
                    "unpack complete"
                );
                Ok(destination.into_path_buf())
            }
            Err(e) => {
                warn!(source = ?request.source, %format, error = %e, "unpack failed");
                self.cleanup(&destination).await;
                Err(e)
            }
        }
    }

    /// Checks, classification and destination resolution, in that order
    async fn prepare(&self, request: &UnpackRequest) -> Result<(ArchiveFormat, ResolvedDestination)> {
        let destination = check_preconditions(request).await?;

        let format = detect_archive_format(&request.source).ok_or_else(|| {
            Error::UnsupportedFormat {
                path: request.source.clone(),
            }
        })?;

        let resolved = resolve_destination(destination, request.randomize_destination).await?;
        debug!(
            source = ?request.source,
            %format,
            destination = ?resolved.path(),
            "resolved unpack destination"
        );
        Ok((format, resolved))
    }

    /// Remove a randomized destination after a failure, if configured to
    async fn cleanup(&self, destination: &ResolvedDestination) {
        if !self.config.cleanup_on_failure || !destination.is_created() {
            return;
        }

        match tokio::fs::remove_dir_all(destination.path()).await {
            Ok(()) => debug!(destination = ?destination.path(), "removed partial output"),
            Err(e) => warn!(
                destination = ?destination.path(),
                error = %e,
                "failed to remove partial output"
            ),
        }
    }
}

/// Bound `fut` by `limit`, mapping expiry to [`Error::Timeout`]
async fn with_timeout<T>(limit: Option<Duration>, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .unwrap_or(Err(Error::Timeout { after })),
        None => fut.await,
    }
}

/// Unpack with the default configuration
///
/// See [`Unpacker::unpack_file`].
pub fn unpack_file(
    source: impl AsRef<Path>,
    destination: Option<&Path>,
    randomize_destination: bool,
) -> UnpackHandle {
    Unpacker::default().unpack_file(source, destination, randomize_destination)
}
