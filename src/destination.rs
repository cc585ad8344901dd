//! Destination directory resolution

use crate::error::{Error, Result};
use crate::utils::with_trailing_separator;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// The directory an archive is unpacked into
///
/// Its textual form always ends with one path separator. Once resolved it is
/// never re-resolved for the same request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDestination {
    path: PathBuf,
    created: bool,
}

impl ResolvedDestination {
    /// The resolved directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory was created by the resolver (randomized destinations)
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Consume into the resolved directory
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

/// Resolve the output directory for a request
///
/// With `randomize` set, a new UUID v4 segment is appended and that directory is
/// created before returning; its parent must already exist. Without it the
/// destination is used as given and nothing is created.
pub async fn resolve_destination(destination: &Path, randomize: bool) -> Result<ResolvedDestination> {
    let base = with_trailing_separator(destination);

    if !randomize {
        return Ok(ResolvedDestination {
            path: base,
            created: false,
        });
    }

    let dir = base.join(Uuid::new_v4().to_string());
    tokio::fs::create_dir(&dir).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to create destination {}: {}", dir.display(), e),
        ))
    })?;

    debug!(?dir, "created randomized destination");

    Ok(ResolvedDestination {
        path: with_trailing_separator(&dir),
        created: true,
    })
}
