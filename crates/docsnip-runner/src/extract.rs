// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Extract test snippets from documentation comments.
//!
//! Snippets are Markdown fenced code blocks. The info string after the
//! opening fence carries the attributes:
//! ```markdown
//! ```test import=std::collections::HashMap
//! let mut map = HashMap::new();
//! map.insert(1, "one");
//! ```
//! ```

use docsnip_ast::DocComment;

/// Attribute marking a snippet as a test.
pub const TEST: &str = "test";
/// Attribute listing extra `use` paths, comma separated.
pub const IMPORT: &str = "import";
/// Attribute that turns a test snippet into a skipped one.
pub const IGNORE: &str = "ignore";

/// One attribute from a fence info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Empty for a bare attribute such as `test`.
    pub values: Vec<String>,
}

impl Attribute {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![value.into()],
        }
    }
}

/// A fenced code block found in a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Code between the fences, fence indentation removed.
    pub body: String,
    pub attributes: Vec<Attribute>,
    /// 1-based source line of the opening fence.
    pub line: u32,
}

impl Snippet {
    pub fn has(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Every value of every attribute called `name`, in order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.name == name)
            .flat_map(|a| a.values.iter().map(String::as_str))
    }

    /// Exactly an attribute named `test`; its values do not matter.
    pub fn is_test(&self) -> bool {
        self.has(TEST)
    }

    pub fn is_ignored(&self) -> bool {
        self.has(IGNORE)
    }

    /// Source line of the first body line.
    pub fn body_line(&self) -> u32 {
        self.line + 1
    }
}

/// Extract every fenced block of a doc comment, tests or not.
pub fn extract_snippets(comment: &DocComment) -> Vec<Snippet> {
    extract_from_text(&comment.text, comment.line)
}

/// Extract fenced blocks from Markdown text whose first line is `first_line`.
pub fn extract_from_text(text: &str, first_line: u32) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let Some(fence) = Fence::open(lines[i]) else {
            i += 1;
            continue;
        };
        let line = first_line + i as u32;
        i += 1;

        let mut body = Vec::new();
        while i < lines.len() && !fence.closes(lines[i]) {
            body.push(strip_indent(lines[i], fence.indent));
            i += 1;
        }
        // Step over the closing fence; an unterminated block ends the text
        i += 1;

        snippets.push(Snippet {
            body: body.join("\n"),
            attributes: parse_attributes(fence.info),
            line,
        });
    }

    snippets
}

/// An opening code fence.
struct Fence<'a> {
    ch: char,
    len: usize,
    indent: usize,
    info: &'a str,
}

impl<'a> Fence<'a> {
    fn open(line: &'a str) -> Option<Self> {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == ch).count();
        if len < 3 {
            return None;
        }
        let info = trimmed[len..].trim();
        if ch == '`' && info.contains('`') {
            return None;
        }
        Some(Fence {
            ch,
            len,
            indent,
            info,
        })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|c| *c == self.ch).count();
        run >= self.len && run == trimmed.chars().count()
    }
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(indent)..]
}

/// Parse a fence info string into attributes.
///
/// Tokens split on whitespace outside quotes. `name=value` gives one value,
/// a bare token gives none, and a bare token with commas (`rust,test`) gives
/// one bare attribute per part.
pub fn parse_attributes(info: &str) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    for token in split_tokens(info) {
        match token.split_once('=') {
            Some((name, value)) => {
                if !name.is_empty() {
                    attributes.push(Attribute::with_value(name, value));
                }
            }
            None => attributes.extend(
                token
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(Attribute::bare),
            ),
        }
    }
    attributes
}

/// Whitespace-separated tokens; `"` or `'` quote a run that may contain
/// whitespace. Quote characters are removed.
fn split_tokens(info: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in info.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
