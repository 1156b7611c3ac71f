// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Item-level parser that builds the documentation tree.
//!
//! Only item headers are parsed. Bodies, signatures and initializers are
//! skipped as balanced token groups, so expressions never need to be
//! understood.

use std::path::PathBuf;

use docsnip_ast::token::{Token, TokenKind};
use docsnip_ast::{DocComment, DocTree, ElementId, ElementKind, LineMap, Span};

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// A `mod name;` declaration whose body lives in another file.
#[derive(Debug, Clone)]
pub struct OutOfLineModule {
    pub id: ElementId,
    pub name: String,
    /// Inline modules enclosing the declaration within its file, outermost
    /// first. `mod a { mod b; }` records `["a"]` for `b`.
    pub inline_path: Vec<String>,
    pub span: Span,
}

/// Result of parsing one file into the tree.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub errors: Vec<ParseError>,
    pub modules: Vec<OutOfLineModule>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The parser for one Rust source file.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    line_map: LineMap,
    file: Option<PathBuf>,
    /// Names of the inline modules currently open.
    inline_path: Vec<String>,
    result: ParseResult,
}

/// Accumulates consecutive doc comment tokens, keeping line alignment.
struct DocBuilder {
    first_line: u32,
    last_line: u32,
    lines: Vec<String>,
}

impl DocBuilder {
    fn new(line: u32) -> Self {
        Self {
            first_line: line,
            last_line: line,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: u32, text: &str) {
        if !self.lines.is_empty() {
            for _ in (self.last_line + 1)..line {
                self.lines.push(String::new());
            }
        }
        let mut count = 0;
        for part in text.split('\n') {
            self.lines.push(part.to_string());
            count += 1;
        }
        self.last_line = line + count.max(1) - 1;
    }

    fn build(self, file: Option<&PathBuf>) -> DocComment {
        let doc = DocComment::new(self.lines.join("\n"), self.first_line);
        match file {
            Some(file) => doc.with_file(file.clone()),
            None => doc,
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            line_map: LineMap::new(source),
            file: None,
            inline_path: Vec::new(),
            result: ParseResult::default(),
        }
    }

    /// Record the file name on every doc comment this parser produces.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Parse every item in the file as a child of `parent`.
    pub fn parse_into(mut self, tree: &mut DocTree, parent: ElementId) -> ParseResult {
        self.parse_items(tree, parent, false);
        self.result
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span { start: 0, end: 0 },
        };
        self.tokens.get(self.pos).or(self.tokens.last()).unwrap_or(&EOF)
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn line(&self) -> u32 {
        self.line_map.line_of(self.current().span.start)
    }

    fn record_error(&mut self, error: ParseError) -> bool {
        self.result.errors.push(error);
        self.result.errors.len() < MAX_ERRORS
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::expected("a name", &other, self.current().span)),
        }
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    /// Skip a balanced `{}`, `()` or `[]` group starting at the current token.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            let kind = self.current_kind();
            if kind.is_open_delim() {
                depth += 1;
            } else if kind.is_close_delim() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.advance();
                    return;
                }
            } else if self.at_end() {
                return;
            }
            self.advance();
        }
    }

    /// Skip a signature up to and including either its `{ ... }` body or a
    /// terminating `;`.
    fn skip_to_body_or_semi(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LBrace if depth == 0 => {
                    self.skip_group();
                    return;
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Eof => return,
                kind if kind.is_open_delim() => depth += 1,
                kind if kind.is_close_delim() => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the `;` ending the item, stepping over any groups.
    fn skip_to_semi(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Semi => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                kind if kind.is_open_delim() => self.skip_group(),
                _ => self.advance(),
            }
        }
    }

    /// Skip `#[...]` or `#![...]`.
    fn skip_attribute(&mut self) {
        self.advance();
        if self.check(&TokenKind::Bang) {
            self.advance();
        }
        if self.check(&TokenKind::LBracket) {
            self.skip_group();
        }
    }

    /// Skip `<...>` generics right after a keyword.
    fn skip_generics(&mut self) {
        if !self.check(&TokenKind::Lt) {
            return;
        }
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::LBrace | TokenKind::Semi | TokenKind::Eof => return,
                _ => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    fn parse_items(&mut self, tree: &mut DocTree, parent: ElementId, nested: bool) {
        let mut pending: Option<DocBuilder> = None;

        loop {
            match self.current_kind().clone() {
                TokenKind::Eof => {
                    if nested {
                        let span = self.current().span;
                        self.record_error(ParseError::expected("'}'", &TokenKind::Eof, span));
                    }
                    return;
                }
                TokenKind::RBrace => {
                    let span = self.current().span;
                    self.advance();
                    if nested {
                        return;
                    }
                    if !self.record_error(ParseError::unmatched_brace(span)) {
                        return;
                    }
                }
                TokenKind::OuterDoc(text) => {
                    let line = self.line();
                    pending.get_or_insert_with(|| DocBuilder::new(line)).push(line, &text);
                    self.advance();
                }
                TokenKind::InnerDoc(_) => {
                    let doc = self.collect_inner_docs();
                    tree.attach_doc(parent, doc.build(self.file.as_ref()));
                }
                TokenKind::Pound => self.skip_attribute(),
                _ => {
                    let doc = pending.take().map(|d| d.build(self.file.as_ref()));
                    if let Err(e) = self.parse_item(tree, parent, doc) {
                        if !self.record_error(e) {
                            return;
                        }
                        self.skip_to_body_or_semi();
                    }
                }
            }
        }
    }

    fn collect_inner_docs(&mut self) -> DocBuilder {
        let mut builder = DocBuilder::new(self.line());
        while let TokenKind::InnerDoc(text) = self.current_kind().clone() {
            let line = self.line();
            builder.push(line, &text);
            self.advance();
        }
        builder
    }

    fn parse_item(
        &mut self,
        tree: &mut DocTree,
        parent: ElementId,
        doc: Option<DocComment>,
    ) -> Result<(), ParseError> {
        // Visibility and qualifiers
        loop {
            match self.current_kind() {
                TokenKind::Pub => {
                    self.advance();
                    if self.check(&TokenKind::LParen) {
                        self.skip_group();
                    }
                }
                TokenKind::Unsafe | TokenKind::Async => self.advance(),
                TokenKind::Ident(word) if word == "default" && self.peek(1) == &TokenKind::Fn => {
                    self.advance()
                }
                TokenKind::Const
                    if matches!(
                        self.peek(1),
                        TokenKind::Fn | TokenKind::Unsafe | TokenKind::Async | TokenKind::Extern
                    ) =>
                {
                    self.advance()
                }
                TokenKind::Extern => {
                    self.advance();
                    match self.current_kind() {
                        TokenKind::Crate => {
                            self.skip_to_semi();
                            return Ok(());
                        }
                        TokenKind::Literal => self.advance(),
                        _ => {}
                    }
                    if self.check(&TokenKind::LBrace) {
                        self.skip_group();
                        return Ok(());
                    }
                }
                _ => break,
            }
        }

        let add = |tree: &mut DocTree, kind: ElementKind, name: String| {
            let id = tree.add_child(parent, kind, name);
            if let Some(doc) = doc.clone() {
                tree.attach_doc(id, doc);
            }
            id
        };

        match self.current_kind().clone() {
            TokenKind::Mod => {
                self.advance();
                let span = self.current().span;
                let name = self.expect_name()?;
                let id = add(tree, ElementKind::Module, name.clone());
                match self.current_kind() {
                    TokenKind::Semi => {
                        self.advance();
                        self.result.modules.push(OutOfLineModule {
                            id,
                            name,
                            inline_path: self.inline_path.clone(),
                            span,
                        });
                    }
                    TokenKind::LBrace => {
                        self.advance();
                        self.inline_path.push(name);
                        self.parse_items(tree, id, true);
                        self.inline_path.pop();
                    }
                    other => {
                        let other = other.clone();
                        return Err(ParseError::expected("'{' or ';'", &other, self.current().span));
                    }
                }
            }
            TokenKind::Fn => {
                self.advance();
                let name = self.expect_name()?;
                add(tree, ElementKind::Function, name);
                self.skip_to_body_or_semi();
            }
            TokenKind::Struct | TokenKind::Enum | TokenKind::Union => {
                let kind = match self.current_kind() {
                    TokenKind::Struct => ElementKind::Struct,
                    TokenKind::Enum => ElementKind::Enum,
                    _ => ElementKind::Union,
                };
                self.advance();
                let name = self.expect_name()?;
                add(tree, kind, name);
                self.skip_to_body_or_semi();
            }
            TokenKind::Trait => {
                self.advance();
                let name = self.expect_name()?;
                let id = add(tree, ElementKind::Trait, name);
                self.parse_member_block(tree, id);
            }
            TokenKind::Impl => {
                self.advance();
                self.skip_generics();
                let name = self.impl_header_name();
                let id = add(tree, ElementKind::Impl, name);
                self.parse_member_block(tree, id);
            }
            TokenKind::Const | TokenKind::Static => {
                let kind = if self.check(&TokenKind::Const) {
                    ElementKind::Const
                } else {
                    ElementKind::Static
                };
                self.advance();
                if matches!(self.current_kind(), TokenKind::Ident(w) if w == "mut") {
                    self.advance();
                }
                let name = self.expect_name()?;
                add(tree, kind, name);
                self.skip_to_semi();
            }
            TokenKind::Type => {
                self.advance();
                let name = self.expect_name()?;
                add(tree, ElementKind::TypeAlias, name);
                self.skip_to_semi();
            }
            TokenKind::MacroRules if self.peek(1) == &TokenKind::Bang => {
                self.advance();
                self.advance();
                let name = self.expect_name()?;
                add(tree, ElementKind::Macro, name);
                self.skip_to_body_or_semi();
                if self.check(&TokenKind::Semi) {
                    self.advance();
                }
            }
            TokenKind::Use => self.skip_to_semi(),
            // Item-level macro invocations and anything unrecognized
            _ => self.skip_to_body_or_semi(),
        }
        Ok(())
    }

    /// Parse `{ members }` of a trait or impl, or skip a `;`-terminated
    /// header such as a trait alias.
    fn parse_member_block(&mut self, tree: &mut DocTree, id: ElementId) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LBrace if depth == 0 => {
                    self.advance();
                    self.parse_items(tree, id, true);
                    return;
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Eof => return,
                kind if kind.is_open_delim() => depth += 1,
                kind if kind.is_close_delim() => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    /// Source text of an impl header between the generics and the body or
    /// `where` clause, with whitespace collapsed: `fmt::Display for Point`.
    fn impl_header_name(&mut self) -> String {
        let start = self.current().span.start;
        let mut end = start;
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::Where | TokenKind::Semi if depth == 0 => break,
                TokenKind::Eof => break,
                kind if kind.is_open_delim() => depth += 1,
                kind if kind.is_close_delim() => depth = depth.saturating_sub(1),
                _ => {}
            }
            end = self.current().span.end;
            self.advance();
        }
        let text = Span::new(start, end).text(self.source).unwrap_or("");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// A parse error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        Self {
            span,
            message: format!("Expected {}, found {}", expected, found.display_name()),
            hint: crate::hints::for_expected(expected, found).map(String::from),
        }
    }

    fn unmatched_brace(span: Span) -> Self {
        Self {
            span,
            message: "Unmatched '}'".to_string(),
            hint: Some("remove the extra '}' or add the missing '{'".to_string()),
        }
    }
}
