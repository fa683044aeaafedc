//! Buildpack packaging
//!
//! A run moves through fixed stages and stops at the first error:
//!
//! | Stage | Module |
//! |-------|--------|
//! | pre-package | [`hook`] |
//! | collect included files | [`Buildpack::include_files`] |
//! | resolve dependencies | [`resolve`] |
//! | write archive | [`path`], [`archive`] |

pub mod archive;
pub mod hook;
pub mod path;
pub mod resolve;

pub use archive::write_archive;
pub use hook::run_pre_package;
pub use path::archive_path;
pub use resolve::resolve_dependencies;

use crate::buildpack::{Buildpack, ManifestBuildpack};
use crate::cache::{Cache, DownloadCache};
use crate::config::Settings;
use crate::error::PackagerResult;
use crate::ui::{ConsoleLogger, Logger};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Packager used by the command line: `buildpack.toml` metadata, a download
/// cache under the buildpack root and console output
pub type DefaultPackager =
    Packager<ManifestBuildpack, DownloadCache<ConsoleLogger>, ConsoleLogger>;

/// Packages one buildpack into a `.tgz`
pub struct Packager<B, C, L> {
    buildpack: B,
    cache: C,
    logger: L,
}

impl DefaultPackager {
    /// Build the packager for the buildpack at `settings.root`
    pub async fn from_settings(settings: &Settings) -> PackagerResult<Self> {
        let buildpack = ManifestBuildpack::load(settings.root()).await?;
        let logger = ConsoleLogger::new();
        let cache = DownloadCache::new(settings.cache_root(), logger);

        Ok(Self::new(buildpack, cache, logger))
    }
}

impl<B, C, L> Packager<B, C, L>
where
    B: Buildpack,
    C: Cache,
    L: Logger,
{
    pub fn new(buildpack: B, cache: C, logger: L) -> Self {
        Self {
            buildpack,
            cache,
            logger,
        }
    }

    /// Package the buildpack under `output`, returning the archive path
    pub async fn create(&self, output: Option<&Path>) -> PackagerResult<PathBuf> {
        self.create_at(output, Local::now().naive_local()).await
    }

    /// Package the buildpack with an explicit clock for snapshot versions
    pub async fn create_at(
        &self,
        output: Option<&Path>,
        now: NaiveDateTime,
    ) -> PackagerResult<PathBuf> {
        let info = self.buildpack.info();
        self.logger
            .first_line(&format!("Packaging {}", info.pretty_version()));

        run_pre_package(
            self.buildpack.root(),
            self.buildpack.pre_package(),
            &self.logger,
        )
        .await?;

        let mut files = self.buildpack.include_files()?;
        debug!("Including {} files", files.len());

        files.extend(resolve_dependencies(&self.buildpack, &self.cache, &self.logger).await?);

        let archive = archive_path(output, info, now)?;
        self.logger
            .first_line(&format!("Creating archive {}", archive.display()));
        write_archive(self.buildpack.root(), &files, &archive, &self.logger)?;

        info!("Packaged {} into {}", info.id, archive.display());
        Ok(archive)
    }
}
