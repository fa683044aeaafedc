//! Archive writer
//!
//! Streams buildpack files into a gzip-compressed tar. The archive is built in
//! a temp file next to the destination and renamed into place once complete,
//! so a failed run never leaves a truncated `.tgz` behind.

use crate::error::{PackagerError, PackagerResult};
use crate::ui::Logger;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode given to the finished archive
#[cfg(unix)]
const ARCHIVE_MODE: u32 = 0o644;

/// Write `files` (relative to `root`) into a `.tgz` at `destination`, in order.
pub fn write_archive(
    root: &Path,
    files: &[PathBuf],
    destination: &Path,
    logger: &impl Logger,
) -> PackagerResult<()> {
    for file in files {
        validate_entry(file)?;
    }

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|e| PackagerError::io(format!("creating directory {}", parent.display()), e))?;

    let temp = NamedTempFile::new_in(parent)
        .map_err(|e| PackagerError::io(format!("creating archive in {}", parent.display()), e))?;

    let mut builder = Builder::new(GzEncoder::new(temp, Compression::default()));
    for file in files {
        logger.subsequent_line(&format!("Adding {}", file.display()));
        append_file(&mut builder, root, file)?;
    }

    let temp = builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| PackagerError::io(format!("finishing archive {}", destination.display()), e))?;

    set_archive_mode(temp.as_file(), destination)?;
    temp.persist(destination).map_err(|e| {
        PackagerError::io(format!("writing archive {}", destination.display()), e.error)
    })?;

    debug!("Wrote {} entries to {}", files.len(), destination.display());
    Ok(())
}

/// Reject entries that are absolute or climb out of the buildpack root
fn validate_entry(path: &Path) -> PackagerResult<()> {
    let escapes = path.as_os_str().is_empty()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

    if escapes {
        return Err(PackagerError::PathEscapes(path.to_path_buf()));
    }
    Ok(())
}

fn append_file<W: std::io::Write>(
    builder: &mut Builder<W>,
    root: &Path,
    path: &Path,
) -> PackagerResult<()> {
    let source = root.join(path);
    let file = File::open(&source)
        .map_err(|e| PackagerError::io(format!("opening {}", source.display()), e))?;
    let metadata = file
        .metadata()
        .map_err(|e| PackagerError::io(format!("reading metadata of {}", source.display()), e))?;

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(metadata.len());
    header.set_mode(file_mode(&metadata));
    header.set_mtime(
        metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs()),
    );

    builder
        .append_data(&mut header, path, file)
        .map_err(|e| PackagerError::io(format!("adding {} to archive", path.display()), e))
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_archive_mode(file: &File, destination: &Path) -> PackagerResult<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(ARCHIVE_MODE))
        .map_err(|e| {
            PackagerError::io(
                format!("setting permissions on {}", destination.display()),
                e,
            )
        })
}

#[cfg(not(unix))]
fn set_archive_mode(_file: &File, _destination: &Path) -> PackagerResult<()> {
    Ok(())
}
