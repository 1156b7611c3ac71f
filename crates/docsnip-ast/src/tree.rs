// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The documentation tree: a crate's declared elements and their doc comments.
//!
//! Elements live in an arena owned by [`DocTree`] and refer to each other by
//! [`ElementId`], so walking up to the enclosing module is as cheap as
//! walking down to the children.

use std::fmt;
use std::path::PathBuf;

/// Index of an element inside its [`DocTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// What kind of declaration an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    Crate,
    Module,
    Function,
    Struct,
    Enum,
    Union,
    Trait,
    Impl,
    Const,
    Static,
    TypeAlias,
    Macro,
}

impl ElementKind {
    /// Short tag used when generating names for synthesized test units.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Crate => "crate",
            ElementKind::Module => "mod",
            ElementKind::Function => "fn",
            ElementKind::Struct => "struct",
            ElementKind::Enum => "enum",
            ElementKind::Union => "union",
            ElementKind::Trait => "trait",
            ElementKind::Impl => "impl",
            ElementKind::Const => "const",
            ElementKind::Static => "static",
            ElementKind::TypeAlias => "type",
            ElementKind::Macro => "macro",
        }
    }

    /// Crates and modules are namespaces that can be glob-imported.
    pub fn is_namespace(&self) -> bool {
        matches!(self, ElementKind::Crate | ElementKind::Module)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The documentation attached to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Markdown text with comment markers removed, one line per source line.
    pub text: String,
    /// File the comment was read from, if it came from disk.
    pub file: Option<PathBuf>,
    /// 1-based line of the first comment line.
    pub line: u32,
}

impl DocComment {
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            file: None,
            line,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// `file:line` for diagnostics, or just the line when there is no file.
    pub fn location(&self, line_offset: u32) -> String {
        let line = self.line + line_offset;
        match &self.file {
            Some(file) => format!("{}:{}", file.display(), line),
            None => format!("line {}", line),
        }
    }
}

/// A declared element: the crate, a module, an item or a member.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    /// Doc comments in source order. More than one only when the docs come
    /// from different files, as with `///` on `mod foo;` plus `//!` in foo.rs.
    pub docs: Vec<DocComment>,
}

impl Element {
    /// The first doc comment, if any.
    pub fn doc(&self) -> Option<&DocComment> {
        self.docs.first()
    }
}

/// Arena of elements forming one or more trees.
#[derive(Debug, Clone, Default)]
pub struct DocTree {
    elements: Vec<Element>,
    roots: Vec<ElementId>,
}

impl DocTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ElementKind, name: String, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Element {
            id,
            kind,
            name,
            parent,
            children: Vec::new(),
            docs: Vec::new(),
        });
        id
    }

    /// Add a top-level element, usually the crate.
    pub fn add_root(&mut self, kind: ElementKind, name: impl Into<String>) -> ElementId {
        let id = self.push(kind, name.into(), None);
        self.roots.push(id);
        id
    }

    pub fn add_child(
        &mut self,
        parent: ElementId,
        kind: ElementKind,
        name: impl Into<String>,
    ) -> ElementId {
        let id = self.push(kind, name.into(), Some(parent));
        self.elements[parent.0 as usize].children.push(id);
        id
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Attach documentation. A later comment from the same file is merged
    /// into the previous one, padded with blank lines so every text line
    /// keeps its source line. A comment from another file is kept separate.
    pub fn attach_doc(&mut self, id: ElementId, doc: DocComment) {
        let docs = &mut self.elements[id.0 as usize].docs;
        match docs.last_mut() {
            Some(existing) if existing.file == doc.file && existing.line <= doc.line => {
                let gap = doc.line.saturating_sub(existing.line + line_count(&existing.text));
                existing.text.push('\n');
                for _ in 0..gap {
                    existing.text.push('\n');
                }
                existing.text.push_str(&doc.text);
            }
            _ => docs.push(doc),
        }
    }

    /// The element itself followed by each enclosing element up to its root.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Names from the outermost ancestor down to the element itself.
    pub fn path(&self, id: ElementId) -> Vec<&str> {
        let mut names: Vec<&str> = self.ancestors(id).map(|e| e.name.as_str()).collect();
        names.reverse();
        names
    }

    /// `crate::module::Item` style name for messages.
    pub fn qualified_name(&self, id: ElementId) -> String {
        self.path(id).join("::")
    }

    /// Nearest crate or module containing the element, the element itself
    /// included.
    pub fn enclosing_namespace(&self, id: ElementId) -> Option<ElementId> {
        self.ancestors(id)
            .find(|e| e.kind.is_namespace())
            .map(|e| e.id)
    }
}

fn line_count(text: &str) -> u32 {
    text.lines().count().max(1) as u32
}

/// Iterator returned by [`DocTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a DocTree,
    next: Option<ElementId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.tree.get(self.next?);
        self.next = element.parent;
        Some(element)
    }
}
