//! Dependency resolution
//!
//! Materializes every declared dependency through the cache and returns the
//! files to archive for it, relative to the buildpack root.

use crate::buildpack::Buildpack;
use crate::cache::{Cache, CacheLayer};
use crate::error::{PackagerError, PackagerResult};
use crate::ui::Logger;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache each dependency in declaration order.
///
/// Returns `[artifact₁, metadata₁, artifact₂, metadata₂, …]`, all relative to
/// the buildpack root. The first failure stops resolution.
pub async fn resolve_dependencies<B, C>(
    buildpack: &B,
    cache: &C,
    logger: &impl Logger,
) -> PackagerResult<Vec<PathBuf>>
where
    B: Buildpack,
    C: Cache,
{
    let dependencies = buildpack.dependencies()?;
    let root = buildpack.root();
    let mut files = Vec::with_capacity(dependencies.len() * 2);

    for dependency in &dependencies {
        logger.first_line(&format!("Caching {}", dependency.pretty_version()));

        let layer = cache.download_layer(dependency);
        let artifact = layer.artifact().await?;

        files.push(relativize(root, &artifact)?);
        files.push(relativize(root, &layer.metadata())?);
    }

    debug!("Resolved {} dependencies", dependencies.len());
    Ok(files)
}

/// Express `path` relative to `root`
fn relativize(root: &Path, path: &Path) -> PackagerResult<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| PackagerError::PathOutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}
