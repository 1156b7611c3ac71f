// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Where a run sends its diagnostics, per-snippet progress and final tally.

use docsnip_diagnostics::Diagnostic;
use serde::Serialize;

use crate::result::TestResult;

/// Final status of one test snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetStatus {
    Passed,
    Failed,
    Skipped,
    Errored,
}

impl SnippetStatus {
    pub fn as_result(self) -> TestResult {
        match self {
            SnippetStatus::Passed => TestResult::PASS,
            SnippetStatus::Failed => TestResult::FAIL,
            SnippetStatus::Skipped => TestResult::SKIP,
            SnippetStatus::Errored => TestResult::ERROR,
        }
    }
}

/// One finished test snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetEvent {
    /// Unit name, empty for skipped snippets that were never synthesized.
    pub unit: String,
    /// `crate::module::Item` path of the documented element.
    pub element: String,
    /// `file:line` of the opening fence.
    pub location: String,
    pub status: SnippetStatus,
}

/// Receives everything a run has to say.
pub trait Reporter {
    fn diagnostic(&mut self, diagnostic: Diagnostic);

    fn snippet_finished(&mut self, _event: &SnippetEvent) {}

    /// Called once after the whole tree has been walked.
    fn summary(&mut self, result: &TestResult);
}

/// `Tests passed: P, failed: F, skipped: S, errored: E`
pub fn summary_line(result: &TestResult) -> String {
    format!(
        "Tests passed: {}, failed: {}, skipped: {}, errored: {}",
        result.pass, result.fail, result.skip, result.error
    )
}

/// Keeps everything in memory, for tests and JSON output.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub diagnostics: Vec<Diagnostic>,
    pub events: Vec<SnippetEvent>,
    pub summaries: Vec<String>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for CollectingReporter {
    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn snippet_finished(&mut self, event: &SnippetEvent) {
        self.events.push(event.clone());
    }

    fn summary(&mut self, result: &TestResult) {
        self.summaries.push(summary_line(result));
    }
}
