// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.
//!
//! Only the parts of Rust's lexical grammar that matter for locating items
//! and their documentation are distinguished. Everything else collapses into
//! `Literal` or `Punct`.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `///` or `/** */` documentation, markers already stripped.
    OuterDoc(String),
    /// `//!` or `/*! */` documentation, markers already stripped.
    InnerDoc(String),

    Ident(String),
    /// String, char, byte and numeric literals. The text is not interpreted.
    Literal,
    Lifetime,

    // Keywords that start or qualify items
    Mod,
    Fn,
    Struct,
    Enum,
    Union,
    Trait,
    Impl,
    Const,
    Static,
    Type,
    Use,
    Extern,
    Crate,
    Pub,
    Unsafe,
    Async,
    For,
    Where,
    MacroRules,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Semi,
    Colon,
    ColonColon,
    Comma,
    Pound,
    Bang,
    Eq,
    Arrow,
    /// Any other punctuation character.
    Punct(char),

    Eof,
}

impl TokenKind {
    /// Human-readable name used in parse error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::OuterDoc(_) => "a doc comment",
            TokenKind::InnerDoc(_) => "an inner doc comment",
            TokenKind::Ident(_) => "a name",
            TokenKind::Literal => "a literal",
            TokenKind::Lifetime => "a lifetime",
            TokenKind::Mod => "'mod'",
            TokenKind::Fn => "'fn'",
            TokenKind::Struct => "'struct'",
            TokenKind::Enum => "'enum'",
            TokenKind::Union => "'union'",
            TokenKind::Trait => "'trait'",
            TokenKind::Impl => "'impl'",
            TokenKind::Const => "'const'",
            TokenKind::Static => "'static'",
            TokenKind::Type => "'type'",
            TokenKind::Use => "'use'",
            TokenKind::Extern => "'extern'",
            TokenKind::Crate => "'crate'",
            TokenKind::Pub => "'pub'",
            TokenKind::Unsafe => "'unsafe'",
            TokenKind::Async => "'async'",
            TokenKind::For => "'for'",
            TokenKind::Where => "'where'",
            TokenKind::MacroRules => "'macro_rules'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Semi => "';'",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Comma => "','",
            TokenKind::Pound => "'#'",
            TokenKind::Bang => "'!'",
            TokenKind::Eq => "'='",
            TokenKind::Arrow => "'->'",
            TokenKind::Punct(_) => "punctuation",
            TokenKind::Eof => "end of file",
        }
    }

    /// Opening delimiter whose group must be skipped as a unit.
    pub fn is_open_delim(&self) -> bool {
        matches!(self, TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket)
    }

    pub fn is_close_delim(&self) -> bool {
        matches!(self, TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket)
    }
}
