//! Error types for the packager
//!
//! All modules use `PackagerResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for packager operations
pub type PackagerResult<T> = Result<T, PackagerError>;

/// All errors that can occur while packaging a buildpack
#[derive(Error, Debug)]
pub enum PackagerError {
    // Argument errors
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    // Manifest errors
    #[error("Buildpack manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid buildpack manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Dependency errors
    #[error("Failed to download {uri}: {reason}")]
    DependencyDownload { uri: String, reason: String },

    #[error("Checksum mismatch for {id}: expected {expected}, got {actual}")]
    DependencyChecksum {
        id: String,
        expected: String,
        actual: String,
    },

    // Path errors
    #[error("Path {path} is not inside buildpack root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Refusing to archive {0}: path must be relative and stay inside the buildpack root")]
    PathEscapes(PathBuf),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pre-package command {command} exited with {}", describe_exit(.code))]
    HookFailed { command: String, code: Option<i32> },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

impl PackagerError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a download error
    pub fn download(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::DependencyDownload {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingArgument(_) => Some("Usage: buildpack-packager <OUTPUT_DIR>"),
            Self::ManifestNotFound(_) => {
                Some("Run from the buildpack root directory containing buildpack.toml")
            }
            Self::DependencyChecksum { .. } => {
                Some("Check the sha256 declared in buildpack.toml against the published artifact")
            }
            _ => None,
        }
    }
}
