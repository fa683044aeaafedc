//! Progress output
//!
//! Packaging progress is reported through the [`Logger`] trait so the
//! packager never writes to stdout directly. [`ConsoleLogger`] is the
//! terminal implementation:
//!
//! ```text
//! -----> Packaging Example Buildpack 1.2.3
//!        Adding bin/build
//! ```

mod output;

pub use output::{ConsoleLogger, Logger};
