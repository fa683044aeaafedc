//! Startup configuration for the packager
//!
//! Everything that used to be read ad hoc from the process environment is
//! captured once in [`Settings`] and handed to the components that need it.

use crate::error::{PackagerError, PackagerResult};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable that enables debug logging to stderr
pub const DEBUG_ENV: &str = "BP_DEBUG";

/// Directory under the buildpack root that holds downloaded dependencies
pub const CACHE_DIR: &str = "dependency-cache";

/// Resolved settings for one packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether debug logging is enabled
    pub debug: bool,

    /// Buildpack root directory (contains buildpack.toml)
    pub root: PathBuf,
}

impl Settings {
    /// Create settings for an explicit buildpack root with debug disabled
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            debug: false,
            root: root.into(),
        }
    }

    /// Load settings from the process environment.
    ///
    /// `BP_DEBUG` enables debug logging when present, whatever its value.
    /// The buildpack root is the current working directory.
    pub fn from_env() -> PackagerResult<Self> {
        let root = std::env::current_dir()
            .map_err(|e| PackagerError::io("getting current directory", e))?;

        Ok(Self::new(root).with_debug(std::env::var_os(DEBUG_ENV).is_some()))
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Root of the dependency cache for this buildpack
    pub fn cache_root(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    /// Buildpack root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log filter matching the debug setting
    pub fn log_filter(&self) -> EnvFilter {
        if self.debug {
            EnvFilter::new("buildpack_packager=debug")
        } else {
            EnvFilter::new("off")
        }
    }
}

/// Initialize diagnostic logging.
///
/// Progress lines go to stdout through the [`Logger`](crate::ui::Logger);
/// this subscriber only carries debug output, and only to stderr.
pub fn init_logging(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
