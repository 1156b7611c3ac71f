// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[D0004]: snippet test failed
//!   --> src/geometry.rs:14
//!    = element: fn shapes::geometry::area
//!    |
//! 16 | let a = area(1.0);
//! 17 | assert_eq!(a, 4.0);
//!    |
//!    = note: exit status: 101
//!    | thread 'main' panicked at src/main.rs:9:1:
//!    | assertion `left == right` failed
//! ```

use colored::Colorize;

use crate::{Diagnostic, Severity};

/// Formats diagnostics for terminal output.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticFormatter {
    /// Stop printing captured output after this many lines.
    max_output_lines: Option<usize>,
}

impl DiagnosticFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_output_lines(mut self, lines: usize) -> Self {
        self.max_output_lines = Some(lines);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        if let Some(ref location) = diagnostic.location {
            out.push_str(&format!("  {} {}\n", "-->".blue(), location.display()));
        }

        let gutter_width = diagnostic
            .excerpt
            .as_ref()
            .map(|e| {
                let last = e.first_line as usize + e.lines.len().saturating_sub(1);
                last.to_string().len()
            })
            .unwrap_or(0)
            .max(2);

        if let Some(ref element) = diagnostic.element {
            out.push_str(&format!(
                "{} {} {}: {} {}\n",
                " ".repeat(gutter_width - 1),
                "=".cyan(),
                "element".cyan().bold(),
                element.kind,
                element.path
            ));
        }

        if let Some(ref excerpt) = diagnostic.excerpt {
            let pipe = format!("{} {}\n", " ".repeat(gutter_width), "|".blue());
            out.push_str(&pipe);
            for (i, line) in excerpt.lines.iter().enumerate() {
                let number = excerpt.first_line as usize + i;
                out.push_str(&format!(
                    "{:>width$} {} {}\n",
                    number.to_string().blue().bold(),
                    "|".blue(),
                    line,
                    width = gutter_width,
                ));
            }
            out.push_str(&pipe);
        }

        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        if let Some(ref code) = diagnostic.code {
            out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            ));
        } else {
            out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold()));
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        let indent = " ".repeat(gutter_width - 1);

        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                indent,
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }

        if let Some(ref help) = diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                indent,
                "=".cyan(),
                "help".cyan().bold(),
                help
            ));
        }

        if let Some(ref output) = diagnostic.output {
            let lines: Vec<&str> = output.lines().collect();
            let shown = self.max_output_lines.unwrap_or(lines.len()).min(lines.len());
            for line in &lines[..shown] {
                out.push_str(&format!("{} {} {}\n", " ".repeat(gutter_width), "|".dimmed(), line));
            }
            if shown < lines.len() {
                out.push_str(&format!(
                    "{} {} {}\n",
                    " ".repeat(gutter_width),
                    "|".dimmed(),
                    format!("... {} more lines", lines.len() - shown).dimmed()
                ));
            }
        }
    }
}
