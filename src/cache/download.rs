//! Download-backed cache layers
//!
//! Artifacts are fetched over HTTP(S) with `ureq`, or copied for `file://`
//! URIs, hashed while they stream to disk and only moved into place once the
//! SHA-256 matches the declared value.

use super::{Cache, CacheLayer};
use crate::buildpack::{Dependency, ARTIFACT_FALLBACK};
use crate::error::{PackagerError, PackagerResult};
use crate::ui::Logger;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use url::Url;

/// Metadata file name inside each layer
pub const METADATA_FILE: &str = "dependency.toml";

/// File-system cache rooted at a directory (normally `<buildpack>/dependency-cache`)
#[derive(Debug, Clone)]
pub struct DownloadCache<L> {
    root: PathBuf,
    logger: L,
}

impl<L: Logger + Clone> DownloadCache<L> {
    /// Create a cache rooted at `root`
    pub fn new(root: impl Into<PathBuf>, logger: L) -> Self {
        Self {
            root: root.into(),
            logger,
        }
    }
}

impl<L: Logger + Clone> Cache for DownloadCache<L> {
    type Layer = DownloadLayer<L>;

    fn download_layer(&self, dependency: &Dependency) -> Self::Layer {
        DownloadLayer {
            root: self.root.join(&dependency.sha256),
            dependency: dependency.clone(),
            logger: self.logger.clone(),
        }
    }
}

/// Cache layer for one dependency
#[derive(Debug, Clone)]
pub struct DownloadLayer<L> {
    root: PathBuf,
    dependency: Dependency,
    logger: L,
}

impl<L: Logger> DownloadLayer<L> {
    /// Artifact location; never the metadata file
    fn artifact_path(&self) -> PathBuf {
        match self.dependency.artifact_name() {
            METADATA_FILE => self.root.join(ARTIFACT_FALLBACK),
            name => self.root.join(name),
        }
    }

    /// Whether the layer already holds an artifact for exactly this dependency
    async fn is_cached(&self) -> bool {
        let metadata = self.metadata();
        let content = match tokio::fs::read_to_string(&metadata).await {
            Ok(c) => c,
            Err(_) => return false,
        };

        match toml::from_str::<Dependency>(&content) {
            Ok(cached) if cached == self.dependency => self.artifact_path().is_file(),
            Ok(_) => {
                debug!("Cached metadata at {} is stale", metadata.display());
                false
            }
            Err(e) => {
                debug!("Ignoring unreadable metadata {}: {}", metadata.display(), e);
                false
            }
        }
    }

    async fn download(&self, artifact: &Path) -> PackagerResult<()> {
        let expected = hex::decode(&self.dependency.sha256).map_err(|e| {
            PackagerError::download(
                &self.dependency.uri,
                format!("invalid sha256 {:?}: {}", self.dependency.sha256, e),
            )
        })?;
        if expected.len() != 32 {
            return Err(PackagerError::download(
                &self.dependency.uri,
                format!("invalid sha256 {:?}: wrong length", self.dependency.sha256),
            ));
        }

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            PackagerError::io(format!("creating cache layer {}", self.root.display()), e)
        })?;

        self.logger.subsequent_line(&format!(
            "Downloading from {}",
            self.dependency.uri
        ));

        let uri = self.dependency.uri.clone();
        let dir = self.root.clone();
        let (temp, digest) = tokio::task::spawn_blocking(move || fetch(&uri, &dir))
            .await
            .map_err(|e| PackagerError::Internal(format!("download task failed: {}", e)))??;

        if digest[..] != expected[..] {
            // Dropping the temp file removes the unverified download
            return Err(PackagerError::DependencyChecksum {
                id: self.dependency.id.clone(),
                expected: self.dependency.sha256.to_lowercase(),
                actual: hex::encode(digest),
            });
        }

        temp.persist(artifact).map_err(|e| {
            PackagerError::io(format!("storing artifact {}", artifact.display()), e.error)
        })?;

        let metadata = self.metadata();
        let content = toml::to_string(&self.dependency)?;
        tokio::fs::write(&metadata, content).await.map_err(|e| {
            PackagerError::io(format!("writing metadata {}", metadata.display()), e)
        })?;

        debug!("Cached {} at {}", self.dependency.id, artifact.display());
        Ok(())
    }
}

#[async_trait(?Send)]
impl<L: Logger> CacheLayer for DownloadLayer<L> {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn artifact(&self) -> PackagerResult<PathBuf> {
        let artifact = self.artifact_path();

        if self.is_cached().await {
            self.logger.subsequent_line("Reusing cached download");
            debug!("Reusing {}", artifact.display());
            return Ok(artifact);
        }

        self.download(&artifact).await?;
        Ok(artifact)
    }

    fn metadata(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }
}

/// Stream `uri` into a temp file in `dir`, returning the file and its SHA-256
fn fetch(uri: &str, dir: &Path) -> PackagerResult<(NamedTempFile, Vec<u8>)> {
    let mut reader = open_source(uri)?;

    let temp = NamedTempFile::new_in(dir)
        .map_err(|e| PackagerError::io(format!("creating temp file in {}", dir.display()), e))?;
    let mut writer = HashingWriter::new(temp);

    io::copy(&mut reader, &mut writer).map_err(|e| PackagerError::download(uri, e))?;
    writer
        .flush()
        .map_err(|e| PackagerError::io("flushing download", e))?;

    debug!("Fetched {} bytes from {}", writer.bytes_written, uri);

    let HashingWriter { inner, hasher, .. } = writer;
    Ok((inner, hasher.finalize().to_vec()))
}

fn open_source(uri: &str) -> PackagerResult<Box<dyn Read>> {
    let path = match Url::parse(uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let response = ureq::get(uri)
                .call()
                .map_err(|e| PackagerError::download(uri, e))?;
            return Ok(Box::new(response.into_body().into_reader()));
        }
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| PackagerError::download(uri, "not a local file path"))?,
        Ok(url) => {
            return Err(PackagerError::download(
                uri,
                format!("unsupported scheme {}", url.scheme()),
            ))
        }
        // Not a URL: a plain file system path
        Err(_) => PathBuf::from(uri),
    };

    let file = File::open(&path).map_err(|e| PackagerError::download(uri, e))?;
    Ok(Box::new(file))
}

struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes_written: u64,
}

impl<W> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_written: 0,
        }
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes_written = self.bytes_written.saturating_add(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
