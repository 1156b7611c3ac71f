// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! docsnip diagnostics.
//!
//! Provides a unified diagnostic type for everything a snippet run reports:
//! source problems found while loading the crate, compiler messages, and
//! failed or unrunnable snippets. Error types from other crates are
//! converted to `Diagnostic` via the `ToDiagnostic` trait.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

use std::path::PathBuf;

use docsnip_ast::ElementKind;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A diagnostic with enough context to point at the offending doc comment.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    /// The documented element the diagnostic is about.
    pub element: Option<ElementRef>,
    pub location: Option<Location>,
    /// Lines of the snippet or source the diagnostic refers to.
    pub excerpt: Option<Excerpt>,
    pub notes: Vec<String>,
    pub help: Option<String>,
    /// Captured process or compiler output, shown verbatim.
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error code like D0004.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// Which element a diagnostic concerns: `fn shapes::geometry::area`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub path: String,
}

/// A position in a source file (1-based line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub line: u32,
}

/// Consecutive source lines starting at `first_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub first_line: u32,
    pub lines: Vec<String>,
}

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    fn new(severity: Severity, message: String) -> Self {
        Self {
            severity,
            code: None,
            message,
            element: None,
            location: None,
            excerpt: None,
            notes: Vec::new(),
            help: None,
            output: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message.into())
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message.into())
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_element(mut self, kind: ElementKind, path: impl Into<String>) -> Self {
        self.element = Some(ElementRef {
            kind,
            path: path.into(),
        });
        self
    }

    pub fn with_location(mut self, file: Option<PathBuf>, line: u32) -> Self {
        self.location = Some(Location { file, line });
        self
    }

    pub fn with_excerpt(mut self, first_line: u32, text: &str) -> Self {
        self.excerpt = Some(Excerpt {
            first_line,
            lines: text.lines().map(String::from).collect(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach captured output. Blank output is dropped.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        let output = output.into();
        if !output.trim().is_empty() {
            self.output = Some(output);
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Location {
    /// `file:line`, or `line N` when the file is unknown.
    pub fn display(&self) -> String {
        match &self.file {
            Some(file) => format!("{}:{}", file.display(), self.line),
            None => format!("line {}", self.line),
        }
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert an error into a rich diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}
