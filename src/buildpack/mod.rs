//! Buildpack metadata
//!
//! The packager only depends on the [`Buildpack`] trait. [`ManifestBuildpack`]
//! is the implementation backed by a `buildpack.toml` in the buildpack root.

pub mod manifest;

pub use manifest::{BuildpackManifest, ManifestBuildpack, MANIFEST_FILE};

use crate::error::PackagerResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifact file name used when the URI does not end in a usable one
pub const ARTIFACT_FALLBACK: &str = "artifact";

/// Identity of a buildpack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackInfo {
    /// Reverse-domain identifier, e.g. `com.example.buildpack`
    pub id: String,

    /// Human-readable name (defaults to the id)
    #[serde(default)]
    pub name: String,

    /// Version string, possibly containing `SNAPSHOT`
    pub version: String,
}

impl BuildpackInfo {
    /// Name and version for progress output
    pub fn pretty_version(&self) -> String {
        pretty_version(&self.name, &self.id, &self.version)
    }
}

/// A dependency declared by the buildpack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    /// Where the artifact is downloaded from (`https://`, `http://` or `file://`)
    pub uri: String,

    /// Expected SHA-256 of the artifact, hex encoded
    pub sha256: String,

    /// Stacks this dependency is compatible with
    #[serde(default)]
    pub stacks: Vec<String>,

    #[serde(default)]
    pub licenses: Vec<License>,
}

impl Dependency {
    /// Name and version for progress output
    pub fn pretty_version(&self) -> String {
        pretty_version(&self.name, &self.id, &self.version)
    }

    /// File name the artifact is stored under, taken from the last URI segment.
    /// Segments that are not a plain file name fall back to [`ARTIFACT_FALLBACK`].
    pub fn artifact_name(&self) -> &str {
        let path = self.uri.split(['?', '#']).next().unwrap_or_default();
        match path.rsplit('/').next() {
            Some("" | "." | "..") | None => ARTIFACT_FALLBACK,
            Some(name) => name,
        }
    }
}

/// License of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

fn pretty_version(name: &str, id: &str, version: &str) -> String {
    let name = if name.is_empty() { id } else { name };
    format!("{} {}", name, version)
}

/// Metadata and layout of the buildpack being packaged
pub trait Buildpack {
    /// Absolute path of the buildpack root
    fn root(&self) -> &Path;

    /// Identity of the buildpack
    fn info(&self) -> &BuildpackInfo;

    /// Files to include in the archive, relative to the root
    fn include_files(&self) -> PackagerResult<Vec<PathBuf>>;

    /// Declared dependencies, in declaration order
    fn dependencies(&self) -> PackagerResult<Vec<Dependency>>;

    /// Command to run before packaging, if any
    fn pre_package(&self) -> Option<&str>;
}
