// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use docsnip_ast::token::{Token, TokenKind};
use docsnip_ast::Span;
use logos::Logos;

/// Raw token type for logos - comments are classified in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("mod")]
    Mod,
    #[token("fn")]
    Fn,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("union")]
    Union,
    #[token("trait")]
    Trait,
    #[token("impl")]
    Impl,
    #[token("const")]
    Const,
    #[token("static")]
    Static,
    #[token("type")]
    Type,
    #[token("use")]
    Use,
    #[token("extern")]
    Extern,
    #[token("crate")]
    Crate,
    #[token("pub")]
    Pub,
    #[token("unsafe")]
    Unsafe,
    #[token("async")]
    Async,
    #[token("for")]
    For,
    #[token("where")]
    Where,
    #[token("macro_rules")]
    MacroRules,

    // === Delimiters and the punctuation the parser looks at ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(";")]
    Semi,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("#")]
    Pound,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,

    // === Comments (doc comments are picked out in convert_token) ===
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    Str,

    #[regex(r##"b?r#*""##, raw_string)]
    RawStr,

    #[regex(r"'([^'\\\n]|\\[^\n]|\\u\{[0-9a-fA-F]{1,6}\})'")]
    Char,

    #[regex(r"'[a-zA-Z_][a-zA-Z0-9_]*")]
    Lifetime,

    #[regex(r"[0-9][0-9a-zA-Z_]*")]
    Number,

    // === Identifiers (must come after keywords) ===
    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    Ident,

    #[regex(r"r#[\p{XID_Start}_]\p{XID_Continue}*")]
    RawIdent,

    // Any other single character. Loses to every punctuation token.
    #[regex(r"[^\s\p{XID_Continue}]", priority = 1)]
    Punct,
}

/// Consume a block comment, handling nesting. Fails when unterminated.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> bool {
    let mut depth = 1;
    let mut chars = lexer.remainder().chars().peekable();
    let mut consumed = 0;

    while depth > 0 {
        match chars.next() {
            Some('/') if chars.peek() == Some(&'*') => {
                chars.next();
                consumed += 2;
                depth += 1;
            }
            Some('*') if chars.peek() == Some(&'/') => {
                chars.next();
                consumed += 2;
                depth -= 1;
            }
            Some(c) => consumed += c.len_utf8(),
            None => break,
        }
    }

    lexer.bump(consumed);
    depth == 0
}

/// Consume a raw string up to the quote followed by the same number of `#`.
fn raw_string(lexer: &mut logos::Lexer<RawToken>) -> bool {
    let hashes = lexer.slice().chars().filter(|c| *c == '#').count();
    let terminator = format!("\"{}", "#".repeat(hashes));
    match lexer.remainder().find(&terminator) {
        Some(at) => {
            lexer.bump(at + terminator.len());
            true
        }
        None => {
            let rest = lexer.remainder().len();
            lexer.bump(rest);
            false
        }
    }
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Rust source code.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => match convert_token(raw, slice) {
                    Some(kind) => kind,
                    None => continue,
                },
                Err(()) => {
                    self.errors.push(LexError::from_slice(slice, span.start, span.end));
                    continue;
                }
            };

            tokens.push(Token {
                kind,
                span: Span::new(span.start, span.end),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }
}

/// Convert a raw logos token to a `TokenKind`. Plain comments yield `None`.
fn convert_token(raw: RawToken, slice: &str) -> Option<TokenKind> {
    Some(match raw {
        RawToken::Mod => TokenKind::Mod,
        RawToken::Fn => TokenKind::Fn,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Union => TokenKind::Union,
        RawToken::Trait => TokenKind::Trait,
        RawToken::Impl => TokenKind::Impl,
        RawToken::Const => TokenKind::Const,
        RawToken::Static => TokenKind::Static,
        RawToken::Type => TokenKind::Type,
        RawToken::Use => TokenKind::Use,
        RawToken::Extern => TokenKind::Extern,
        RawToken::Crate => TokenKind::Crate,
        RawToken::Pub => TokenKind::Pub,
        RawToken::Unsafe => TokenKind::Unsafe,
        RawToken::Async => TokenKind::Async,
        RawToken::For => TokenKind::For,
        RawToken::Where => TokenKind::Where,
        RawToken::MacroRules => TokenKind::MacroRules,

        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Semi => TokenKind::Semi,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Pound => TokenKind::Pound,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::LineComment => return line_doc(slice),
        RawToken::BlockComment => return block_doc(slice),

        RawToken::Str | RawToken::RawStr | RawToken::Char | RawToken::Number => {
            TokenKind::Literal
        }
        RawToken::Lifetime => TokenKind::Lifetime,
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::RawIdent => TokenKind::Ident(slice[2..].to_string()),
        RawToken::Punct => TokenKind::Punct(slice.chars().next().unwrap_or('?')),
    })
}

/// `///` and `//!` lines become doc tokens; `////` and plain `//` do not.
fn line_doc(slice: &str) -> Option<TokenKind> {
    let slice = slice.trim_end_matches('\r');
    if let Some(rest) = slice.strip_prefix("///") {
        if rest.starts_with('/') {
            return None;
        }
        return Some(TokenKind::OuterDoc(strip_one_space(rest).to_string()));
    }
    slice
        .strip_prefix("//!")
        .map(|rest| TokenKind::InnerDoc(strip_one_space(rest).to_string()))
}

/// `/** */` and `/*! */` blocks become doc tokens; `/***` and `/**/` do not.
fn block_doc(slice: &str) -> Option<TokenKind> {
    if slice == "/**/" || slice.starts_with("/***") {
        return None;
    }
    let inner = slice.get(3..slice.len().saturating_sub(2)).unwrap_or("");
    if slice.starts_with("/**") {
        Some(TokenKind::OuterDoc(block_doc_text(inner)))
    } else if slice.starts_with("/*!") {
        Some(TokenKind::InnerDoc(block_doc_text(inner)))
    } else {
        None
    }
}

/// Strip the conventional ` * ` gutter from each line of a block doc.
fn block_doc_text(inner: &str) -> String {
    let mut lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let text = match trimmed.strip_prefix('*') {
                Some(rest) => strip_one_space(rest),
                None => strip_one_space(line),
            };
            text.trim_end()
        })
        .collect();
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn strip_one_space(s: &str) -> &str {
    s.strip_prefix(' ').unwrap_or(s)
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn from_slice(slice: &str, start: usize, end: usize) -> Self {
        let span = Span::new(start, end);
        if slice.starts_with("/*") {
            Self {
                span,
                message: "Unterminated block comment".to_string(),
                hint: Some("Add a closing '*/'".to_string()),
            }
        } else if slice.starts_with('r') || slice.starts_with("br") {
            Self {
                span,
                message: "Unterminated raw string".to_string(),
                hint: Some("Close the string with '\"' and the same number of '#'".to_string()),
            }
        } else {
            let ch = slice.chars().next().unwrap_or('?');
            Self {
                span,
                message: format!("Unexpected character '{}'", ch),
                hint: None,
            }
        }
    }
}
