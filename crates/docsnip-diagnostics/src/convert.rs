// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions to `Diagnostic`.
//!
//! Covers the warnings produced while loading a crate and the JSON messages
//! rustc prints with `--error-format=json`.

use serde::Deserialize;

use crate::{codes, Diagnostic, Severity, ToDiagnostic};
use docsnip_parser::SourceWarning;

// ============================================================================
// Source Warnings
// ============================================================================

impl ToDiagnostic for SourceWarning {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SourceWarning::MissingModule {
                module,
                declared_in,
                line,
                searched,
            } => {
                let mut diag = Diagnostic::warning(format!("file for module `{}` not found", module))
                    .with_code(codes::MISSING_MODULE)
                    .with_location(Some(declared_in.clone()), *line)
                    .with_help("snippets in this module are not tested");
                for path in searched {
                    diag = diag.with_note(format!("looked for {}", path.display()));
                }
                diag
            }
            SourceWarning::Syntax {
                file,
                line,
                message,
                hint,
            } => {
                let diag = Diagnostic::warning(message.clone())
                    .with_code(codes::SYNTAX)
                    .with_location(Some(file.clone()), *line)
                    .with_note("items after this point may have been skipped");
                match hint {
                    Some(hint) => diag.with_help(hint.clone()),
                    None => diag,
                }
            }
        }
    }
}

// ============================================================================
// Compiler Messages
// ============================================================================

/// One message from rustc's JSON diagnostic stream.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerMessage {
    pub message: String,
    pub level: String,
    #[serde(default)]
    pub code: Option<CompilerCode>,
    #[serde(default)]
    pub spans: Vec<CompilerSpan>,
    #[serde(default)]
    pub children: Vec<CompilerMessage>,
    #[serde(default)]
    pub rendered: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilerCode {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSpan {
    pub line_start: u32,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub label: Option<String>,
}

impl CompilerMessage {
    pub fn severity(&self) -> Severity {
        if self.level.starts_with("error") {
            Severity::Error
        } else if self.level == "warning" {
            Severity::Warning
        } else {
            Severity::Note
        }
    }

    /// Line of the primary span in the compiled unit's source, if any.
    pub fn primary_line(&self) -> Option<u32> {
        self.spans
            .iter()
            .find(|s| s.is_primary)
            .or(self.spans.first())
            .map(|s| s.line_start)
    }
}

/// Compiler stderr split into JSON messages and anything else it printed.
#[derive(Debug, Default)]
pub struct CompilerOutput {
    pub messages: Vec<CompilerMessage>,
    /// Lines that were not JSON diagnostics, such as linker errors.
    pub other: String,
}

impl CompilerOutput {
    pub fn errors(&self) -> impl Iterator<Item = &CompilerMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity() == Severity::Error)
    }

    /// Human-readable text: rendered messages followed by other output.
    pub fn rendered(&self) -> String {
        let mut out: String = self
            .messages
            .iter()
            .filter_map(|m| m.rendered.as_deref())
            .collect();
        out.push_str(&self.other);
        out
    }
}

/// Split rustc's stderr produced with `--error-format=json`.
pub fn parse_compiler_output(stderr: &str) -> CompilerOutput {
    let mut output = CompilerOutput::default();
    for line in stderr.lines() {
        let parsed = line
            .trim_start()
            .starts_with('{')
            .then(|| serde_json::from_str::<CompilerMessage>(line).ok())
            .flatten();
        match parsed {
            Some(message) => output.messages.push(message),
            None => {
                output.other.push_str(line);
                output.other.push('\n');
            }
        }
    }
    output
}

impl ToDiagnostic for CompilerMessage {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::new(self.severity(), self.message.clone());
        if let Some(code) = &self.code {
            diag = diag.with_code(code.code.clone());
        }
        for span in self.spans.iter().filter(|s| s.is_primary) {
            if let Some(label) = &span.label {
                diag = diag.with_note(label.clone());
            }
        }
        for child in &self.children {
            if child.level == "help" {
                diag = diag.with_help(child.message.clone());
            } else {
                diag = diag.with_note(format!("{}: {}", child.level, child.message));
            }
        }
        match &self.rendered {
            Some(rendered) => diag.with_output(rendered.clone()),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const RUSTC_STDERR: &str = r#"{"$message_type":"diagnostic","message":"cannot find value `nope` in this scope","code":{"code":"E0425","explanation":"..."},"level":"error","spans":[{"file_name":"<anon>","byte_start":120,"byte_end":124,"line_start":7,"line_end":7,"column_start":9,"column_end":13,"is_primary":true,"text":[],"label":"not found in this scope","suggested_replacement":null,"suggestion_applicability":null,"expansion":null}],"children":[{"message":"consider importing this function","code":null,"level":"help","spans":[],"children":[],"rendered":null}],"rendered":"error[E0425]: cannot find value `nope` in this scope\n"}
{"$message_type":"diagnostic","message":"aborting due to 1 previous error","code":null,"level":"error","spans":[],"children":[],"rendered":"error: aborting due to 1 previous error\n"}
note: some extra text
"#;

    #[test]
    fn splits_json_from_plain_lines() {
        let output = parse_compiler_output(RUSTC_STDERR);
        assert_eq!(output.messages.len(), 2);
        assert_eq!(output.other, "note: some extra text\n");
        assert_eq!(output.errors().count(), 2);
        assert_eq!(output.messages[0].primary_line(), Some(7));
        assert_eq!(output.messages[1].primary_line(), None);
        assert!(output.rendered().starts_with("error[E0425]"));
        assert!(output.rendered().ends_with("note: some extra text\n"));
    }

    #[test]
    fn compiler_message_to_diagnostic() {
        let output = parse_compiler_output(RUSTC_STDERR);
        let diag = output.messages[0].to_diagnostic();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_ref().unwrap().0, "E0425");
        assert_eq!(diag.notes, vec!["not found in this scope"]);
        assert_eq!(diag.help.as_deref(), Some("consider importing this function"));
        assert!(diag.output.is_some());
    }

    #[test]
    fn malformed_json_line_is_kept_as_text() {
        let output = parse_compiler_output("{not json\n");
        assert!(output.messages.is_empty());
        assert_eq!(output.other, "{not json\n");
    }

    #[test]
    fn warning_levels() {
        let msg = CompilerMessage {
            message: "unused".into(),
            level: "warning".into(),
            code: None,
            spans: Vec::new(),
            children: Vec::new(),
            rendered: None,
        };
        assert_eq!(msg.severity(), Severity::Warning);
        let ice = CompilerMessage {
            level: "error: internal compiler error".into(),
            ..msg.clone()
        };
        assert_eq!(ice.severity(), Severity::Error);
        let note = CompilerMessage {
            level: "failure-note".into(),
            ..msg
        };
        assert_eq!(note.severity(), Severity::Note);
    }

    #[test]
    fn missing_module_warning() {
        let warning = SourceWarning::MissingModule {
            module: "gone".into(),
            declared_in: PathBuf::from("src/lib.rs"),
            line: 3,
            searched: vec![PathBuf::from("src/gone.rs"), PathBuf::from("src/gone/mod.rs")],
        };
        let diag = warning.to_diagnostic();
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code.as_ref().unwrap().0, codes::MISSING_MODULE);
        assert_eq!(diag.location.as_ref().unwrap().display(), "src/lib.rs:3");
        assert_eq!(diag.notes.len(), 2);
    }

    #[test]
    fn syntax_warning_keeps_hint() {
        let warning = SourceWarning::Syntax {
            file: PathBuf::from("src/lib.rs"),
            line: 9,
            message: "Unmatched '}'".into(),
            hint: Some("remove the extra '}'".into()),
        };
        let diag = warning.to_diagnostic();
        assert_eq!(diag.code.as_ref().unwrap().0, codes::SYNTAX);
        assert_eq!(diag.help.as_deref(), Some("remove the extra '}'"));
    }
}
