// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.

use colored::{ColoredString, Colorize};
use docsnip_runner::{SnippetStatus, TestResult};

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        colored::control::set_override(true);
    }
}

// === Error Output ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

// === Snippet Status ===

pub fn status(status: SnippetStatus) -> ColoredString {
    match status {
        SnippetStatus::Passed => "ok".green(),
        SnippetStatus::Failed => "FAILED".red().bold(),
        SnippetStatus::Skipped => "ignored".yellow(),
        SnippetStatus::Errored => "ERROR".red(),
    }
}

pub fn unit_name(name: &str) -> ColoredString {
    name.bold()
}

pub fn location(loc: &str) -> ColoredString {
    loc.dimmed()
}

// === Help Output ===

pub fn title(name: &str) -> ColoredString {
    name.bold()
}

pub fn version(v: &str) -> ColoredString {
    v.dimmed()
}

pub fn section_header(header: &str) -> ColoredString {
    header.yellow().bold()
}

pub fn command(name: &str) -> ColoredString {
    name.green()
}

pub fn arg(name: &str) -> ColoredString {
    name.cyan()
}

// === Test Summary ===

pub fn separator(width: usize) -> ColoredString {
    "─".repeat(width).dimmed()
}

/// The summary line, green when nothing failed or errored.
pub fn summary(result: &TestResult) -> ColoredString {
    let line = docsnip_runner::summary_line(result);
    if result.is_success() {
        line.green().bold()
    } else {
        line.red().bold()
    }
}
