//! Buildpack Packager
//!
//! Packages a buildpack directory and its cached dependencies into a
//! versioned, gzip-compressed tar archive.

pub mod buildpack;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod package;
pub mod ui;

pub use error::{PackagerError, PackagerResult};
