// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared data types for docsnip.
//!
//! This crate defines the tokens produced by the lexer and the documentation
//! tree built by the parser and walked by the snippet runner.

pub mod span;
pub mod token;
pub mod tree;

pub use span::{LineMap, Span};
pub use tree::{DocComment, DocTree, Element, ElementId, ElementKind};
