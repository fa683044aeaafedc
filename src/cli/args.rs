//! CLI argument definitions using clap derive

use clap::Parser;
use std::path::PathBuf;

/// Package a buildpack into a versioned .tgz archive
///
/// Run from the buildpack root (the directory containing buildpack.toml).
/// Set BP_DEBUG to any value to print debug logging to stderr.
#[derive(Parser, Debug)]
#[command(name = "buildpack-packager")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Root directory the archive tree is written under
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: Option<PathBuf>,
}
