// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (D0001, D0100, etc.) to titles and categories.
//! Used for error display and JSON output.

use std::collections::HashMap;

pub const COMPILE_FAILED: &str = "D0001";
pub const ARTIFACT_NOT_FOUND: &str = "D0002";
pub const LAUNCH_FAILED: &str = "D0003";
pub const SNIPPET_FAILED: &str = "D0004";
pub const SNIPPET_TIMED_OUT: &str = "D0005";
pub const SYNTAX: &str = "D0100";
pub const MISSING_MODULE: &str = "D0101";

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The snippet ran and did not succeed.
    Test,
    /// The snippet could not be compiled, found or started.
    Infrastructure,
    /// The crate's own source could not be fully read.
    Source,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Test => write!(f, "Test"),
            ErrorCategory::Infrastructure => write!(f, "Infrastructure"),
            ErrorCategory::Source => write!(f, "Source"),
        }
    }
}

macro_rules! register_codes {
    ($($code:expr => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                COMPILE_FAILED => ("snippet failed to compile", Infrastructure),
                ARTIFACT_NOT_FOUND => ("compiled snippet not found", Infrastructure),
                LAUNCH_FAILED => ("snippet could not be started", Infrastructure),
                SNIPPET_FAILED => ("snippet test failed", Test),
                SNIPPET_TIMED_OUT => ("snippet test timed out", Test),
                SYNTAX => ("source could not be parsed", Source),
                MISSING_MODULE => ("module file not found", Source),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}
