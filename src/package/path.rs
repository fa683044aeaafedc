//! Destination path of the archive
//!
//! Archives are laid out Maven-style under the output directory:
//! `<out>/<id segments>/<id>/<version>/<id>-<version>.tgz`. Snapshot versions
//! keep their literal version directory but get a timestamped file name.

use crate::buildpack::BuildpackInfo;
use crate::error::{PackagerError, PackagerResult};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Token in a version string marking an unreleased build
pub const SNAPSHOT: &str = "SNAPSHOT";

const TIMESTAMP_FORMAT: &str = "%Y%m%d.%H%M%S";

/// Compute where the archive for `info` is written.
///
/// `now` only matters for versions containing `SNAPSHOT`; released versions
/// always map to the same path.
pub fn archive_path(
    output: Option<&Path>,
    info: &BuildpackInfo,
    now: NaiveDateTime,
) -> PackagerResult<PathBuf> {
    let output = output
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(PackagerError::MissingArgument("output directory"))?;

    let mut path = output.to_path_buf();
    path.extend(info.id.split('.').filter(|s| !s.is_empty()));
    path.push(&info.id);
    path.push(&info.version);
    path.push(format!(
        "{}-{}.tgz",
        info.id,
        snapshot_version(&info.version, now)
    ));

    Ok(path)
}

/// Replace the first `SNAPSHOT` in `version` with `<YYYYMMDD.HHMMSS>-1`
pub fn snapshot_version(version: &str, now: NaiveDateTime) -> String {
    let timestamp = format!("{}-1", now.format(TIMESTAMP_FORMAT));
    version.replacen(SNAPSHOT, &timestamp, 1)
}
