//! Output functions for consistent CLI formatting

use console::style;
use std::io::Write;

/// Sink for packaging progress lines
pub trait Logger {
    /// Start of a new stage
    fn first_line(&self, message: &str);

    /// Detail line belonging to the current stage
    fn subsequent_line(&self, message: &str);
}

/// Logger printing to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    /// Create a new console logger
    pub fn new() -> Self {
        Self
    }
}

impl Logger for ConsoleLogger {
    fn first_line(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", format_first_line(message)).ok();
    }

    fn subsequent_line(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", format_subsequent_line(message)).ok();
    }
}

fn format_first_line(message: &str) -> String {
    format!("{} {}", style("----->").bold(), message)
}

fn format_subsequent_line(message: &str) -> String {
    format!("       {}", message)
}
