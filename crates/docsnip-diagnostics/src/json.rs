// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Use `--format json` with `docsnip test` to get this output.

use serde::Serialize;

use crate::{codes::ErrorCodeRegistry, Diagnostic, ElementRef, Excerpt, Location, Severity};

/// All diagnostics from one run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Whether no error-level diagnostics were produced.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with its code's category.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error category (e.g., "Test", "Infrastructure").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Short title registered for the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<Excerpt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic]) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let mut error_count = 0;
    let mut warning_count = 0;

    let json_diags: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| {
            match d.severity {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Note => {}
            }
            to_json_diagnostic(d, &registry)
        })
        .collect();

    DiagnosticReport {
        version: 1,
        success: error_count == 0,
        diagnostics: json_diags,
        error_count,
        warning_count,
    }
}

fn to_json_diagnostic(diag: &Diagnostic, registry: &ErrorCodeRegistry) -> JsonDiagnostic {
    let code = diag.code.as_ref().map(|c| c.0.clone());
    let info = code.as_deref().and_then(|c| registry.get(c));

    JsonDiagnostic {
        severity: diag.severity,
        category: info.map(|i| i.category.to_string()),
        title: info.map(|i| i.title.to_string()),
        code,
        message: diag.message.clone(),
        element: diag.element.clone(),
        location: diag.location.clone(),
        excerpt: diag.excerpt.clone(),
        notes: diag.notes.clone(),
        help: diag.help.clone(),
        output: diag.output.clone(),
    }
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use docsnip_ast::ElementKind;

    #[test]
    fn report_counts_and_categories() {
        let diags = vec![
            Diagnostic::error("snippet test failed")
                .with_code(codes::SNIPPET_FAILED)
                .with_element(ElementKind::Struct, "shapes::Circle"),
            Diagnostic::warning("module file not found").with_code(codes::MISSING_MODULE),
            Diagnostic::note("rustc said something").with_code("E0425"),
        ];
        let report = to_json_report(&diags);
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.diagnostics[0].category.as_deref(), Some("Test"));
        assert_eq!(report.diagnostics[1].category.as_deref(), Some("Source"));
        assert_eq!(report.diagnostics[2].category, None);

        let value: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();
        let first = &value["diagnostics"][0];
        assert_eq!(first["severity"], "error");
        assert_eq!(first["code"], "D0004");
        assert_eq!(first["element"]["kind"], "struct");
        assert_eq!(first["element"]["path"], "shapes::Circle");
        assert!(first.get("notes").is_none());
    }

    #[test]
    fn empty_report_succeeds() {
        let report = to_json_report(&[]);
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
    }
}
