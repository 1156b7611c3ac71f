// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for Rust source files.
//!
//! Tokenizes just enough of Rust to find items and the documentation
//! comments attached to them.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
