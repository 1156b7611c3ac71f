// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for Rust crates' item structure and documentation.
//!
//! Turns a token stream into a [`DocTree`](docsnip_ast::DocTree) of the
//! crate, its modules and their items, each carrying its doc comment.

mod hints;
mod parser;
pub mod source;

pub use parser::{OutOfLineModule, ParseError, ParseResult, Parser};
pub use source::{
    crate_name_from_manifest, find_manifest, load_crate, parse_str, SourceCrate, SourceError,
    SourceWarning,
};
