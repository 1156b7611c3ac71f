// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Human-readable progress and diagnostics on the terminal.

use docsnip_diagnostics::formatter::DiagnosticFormatter;
use docsnip_diagnostics::Diagnostic;
use docsnip_runner::{Reporter, SnippetEvent, SnippetStatus, TestResult};

use crate::output;

/// Prints one line per snippet to stdout and diagnostics to stderr.
pub struct TerminalReporter {
    formatter: DiagnosticFormatter,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            formatter: DiagnosticFormatter::new(),
        }
    }
}

impl Reporter for TerminalReporter {
    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", self.formatter.format(&diagnostic));
    }

    fn snippet_finished(&mut self, event: &SnippetEvent) {
        let name = match event.status {
            SnippetStatus::Skipped => &event.element,
            _ => &event.unit,
        };
        println!(
            "test {} ({}) ... {}",
            output::unit_name(name),
            output::location(&event.location),
            output::status(event.status)
        );
    }

    fn summary(&mut self, result: &TestResult) {
        println!("{}", output::separator(50));
        println!("{}", output::summary(result));
    }
}
