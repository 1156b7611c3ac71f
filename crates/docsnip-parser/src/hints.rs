// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints for the handful of places the item parser can fail.

use docsnip_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on what was found instead.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("a name", TokenKind::Literal) => Some("names can't start with a number"),
        ("a name", TokenKind::LBrace) => Some("the item is missing its name"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("'{' or ';'", _) => Some("syntax: mod name; or mod name { ... }"),

        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),
        ("'}'", _) => None,

        _ => None,
    }
}
