//! Buildpack manifest parsing
//!
//! Each buildpack has a `buildpack.toml` at its root describing its identity,
//! the files to package, an optional pre-package hook and its dependencies.

use super::{Buildpack, BuildpackInfo, Dependency};
use crate::error::{PackagerError, PackagerResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file name in the buildpack root
pub const MANIFEST_FILE: &str = "buildpack.toml";

/// Parsed `buildpack.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct BuildpackManifest {
    /// Buildpack identity
    pub buildpack: BuildpackInfo,

    /// Stacks the buildpack supports
    #[serde(default)]
    pub stacks: Vec<Stack>,

    /// Packaging metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// Stack entry
#[derive(Debug, Clone, Deserialize)]
pub struct Stack {
    pub id: String,
}

/// `[metadata]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    /// Files to include in the archive, relative to the buildpack root
    #[serde(default)]
    pub include_files: Vec<String>,

    /// Command run before packaging
    #[serde(default)]
    pub pre_package: Option<String>,

    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl BuildpackManifest {
    /// Parse a manifest from a TOML file on disk
    pub async fn from_file(path: &Path) -> PackagerResult<Self> {
        if !path.exists() {
            return Err(PackagerError::ManifestNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PackagerError::io(format!("reading manifest {}", path.display()), e))?;

        Self::parse(&content).map_err(|reason| PackagerError::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut manifest: Self = toml::from_str(content).map_err(|e| e.to_string())?;

        if manifest.buildpack.id.trim().is_empty() {
            return Err("buildpack.id must not be empty".to_string());
        }
        if manifest.buildpack.version.trim().is_empty() {
            return Err("buildpack.version must not be empty".to_string());
        }
        if manifest.buildpack.name.is_empty() {
            manifest.buildpack.name = manifest.buildpack.id.clone();
        }

        Ok(manifest)
    }
}

/// A buildpack loaded from its root directory
#[derive(Debug, Clone)]
pub struct ManifestBuildpack {
    root: PathBuf,
    manifest: BuildpackManifest,
}

impl ManifestBuildpack {
    /// Load `buildpack.toml` from the given root
    pub async fn load(root: &Path) -> PackagerResult<Self> {
        let path = root.join(MANIFEST_FILE);
        let manifest = BuildpackManifest::from_file(&path).await?;

        debug!(
            "Loaded {} with {} include files and {} dependencies",
            path.display(),
            manifest.metadata.include_files.len(),
            manifest.metadata.dependencies.len()
        );

        Ok(Self::new(root.to_path_buf(), manifest))
    }

    /// Wrap an already parsed manifest
    pub fn new(root: PathBuf, manifest: BuildpackManifest) -> Self {
        Self { root, manifest }
    }
}

impl Buildpack for ManifestBuildpack {
    fn root(&self) -> &Path {
        &self.root
    }

    fn info(&self) -> &BuildpackInfo {
        &self.manifest.buildpack
    }

    fn include_files(&self) -> PackagerResult<Vec<PathBuf>> {
        Ok(self
            .manifest
            .metadata
            .include_files
            .iter()
            .map(PathBuf::from)
            .collect())
    }

    fn dependencies(&self) -> PackagerResult<Vec<Dependency>> {
        Ok(self.manifest.metadata.dependencies.clone())
    }

    fn pre_package(&self) -> Option<&str> {
        self.manifest
            .metadata
            .pre_package
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL_MANIFEST: &str = r#"
[buildpack]
id = "com.example.buildpack"
name = "Example Buildpack"
version = "1.2.3"

[[stacks]]
id = "io.buildpacks.stacks.bionic"

[metadata]
include_files = ["bin/build", "bin/detect", "buildpack.toml"]
pre_package = "ci/pre-package.sh"

[[metadata.dependencies]]
id = "openjdk-jdk"
name = "OpenJDK JDK"
version = "11.0.1"
uri = "https://example.com/jdk-11.0.1.tgz"
sha256 = "abc123"
stacks = ["io.buildpacks.stacks.bionic"]

  [[metadata.dependencies.licenses]]
  type = "GPL-2.0-WITH-Classpath-exception-2.0"

[[metadata.dependencies]]
id = "memory-calculator"
version = "3.6.1"
uri = "https://example.com/memory-calculator.tgz"
sha256 = "def456"
"#;

    #[test]
    fn parse_full_manifest() {
        let manifest = BuildpackManifest::parse(FULL_MANIFEST).unwrap();
        assert_eq!(manifest.buildpack.id, "com.example.buildpack");
        assert_eq!(manifest.buildpack.version, "1.2.3");
        assert_eq!(manifest.stacks[0].id, "io.buildpacks.stacks.bionic");
        assert_eq!(manifest.metadata.include_files.len(), 3);
        assert_eq!(
            manifest.metadata.pre_package.as_deref(),
            Some("ci/pre-package.sh")
        );

        let deps = &manifest.metadata.dependencies;
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].id, "openjdk-jdk");
        assert_eq!(
            deps[0].licenses[0].kind.as_deref(),
            Some("GPL-2.0-WITH-Classpath-exception-2.0")
        );
        assert!(deps[1].stacks.is_empty());
    }

    #[test]
    fn name_defaults_to_id() {
        let manifest = BuildpackManifest::parse(
            r#"
[buildpack]
id = "com.example.minimal"
version = "0.0.1"
"#,
        )
        .unwrap();

        assert_eq!(manifest.buildpack.name, "com.example.minimal");
        assert!(manifest.metadata.include_files.is_empty());
        assert!(manifest.metadata.dependencies.is_empty());
    }

    #[test]
    fn missing_version_errors() {
        let result = BuildpackManifest::parse(
            r#"
[buildpack]
id = "com.example.broken"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_id_errors() {
        let result = BuildpackManifest::parse(
            r#"
[buildpack]
id = ""
version = "1.0.0"
"#,
        );
        assert!(result.unwrap_err().contains("buildpack.id"));
    }

    #[tokio::test]
    async fn load_from_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), FULL_MANIFEST).unwrap();

        let buildpack = ManifestBuildpack::load(dir.path()).await.unwrap();
        assert_eq!(buildpack.root(), dir.path());
        assert_eq!(buildpack.info().name, "Example Buildpack");
        assert_eq!(buildpack.pre_package(), Some("ci/pre-package.sh"));
        assert_eq!(
            buildpack.include_files().unwrap(),
            vec![
                PathBuf::from("bin/build"),
                PathBuf::from("bin/detect"),
                PathBuf::from("buildpack.toml"),
            ]
        );
        let ids: Vec<_> = buildpack
            .dependencies()
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["openjdk-jdk", "memory-calculator"]);
    }

    #[tokio::test]
    async fn load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = ManifestBuildpack::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PackagerError::ManifestNotFound(_)));
    }

    #[tokio::test]
    async fn load_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[buildpack\nid =").unwrap();

        let err = ManifestBuildpack::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PackagerError::ManifestInvalid { .. }));
    }

    #[test]
    fn blank_pre_package_is_absent() {
        let manifest = BuildpackManifest::parse(
            r#"
[buildpack]
id = "com.example.buildpack"
version = "1.0.0"

[metadata]
pre_package = "  "
"#,
        )
        .unwrap();
        let buildpack = ManifestBuildpack::new(PathBuf::from("/bp"), manifest);
        assert!(buildpack.pre_package().is_none());
    }
}
