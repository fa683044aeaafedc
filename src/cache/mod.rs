//! Dependency cache
//!
//! Every declared dependency is materialized into a cache layer before it is
//! packaged. A layer is keyed by the dependency's SHA-256, so the same
//! artifact is downloaded once and reused by later runs.
//!
//! # Layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `<cache_root>/<sha256>/` | Layer root |
//! | `<cache_root>/<sha256>/<file>` | Downloaded artifact |
//! | `<cache_root>/<sha256>/dependency.toml` | Dependency metadata |

pub mod download;

pub use download::{DownloadCache, DownloadLayer, METADATA_FILE};

use crate::buildpack::Dependency;
use crate::error::PackagerResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A cache that hands out one layer per dependency
pub trait Cache {
    type Layer: CacheLayer;

    /// Get the layer for a dependency. Nothing is downloaded until
    /// [`CacheLayer::artifact`] is called.
    fn download_layer(&self, dependency: &Dependency) -> Self::Layer;
}

/// A single cached dependency
#[async_trait(?Send)]
pub trait CacheLayer {
    /// Directory holding the layer's files
    fn root(&self) -> &Path;

    /// Path of the artifact, downloading it first unless a valid copy exists
    async fn artifact(&self) -> PackagerResult<PathBuf>;

    /// Path of the metadata file describing the cached artifact
    fn metadata(&self) -> PathBuf;
}
