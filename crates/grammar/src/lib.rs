// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Trilogy Grammar
//!
//! This crate turns query-language text into an untyped [`ParseTree`].
//!
//! ## Modes
//!
//! - **Strict** ([`parse`]): the first syntax error is returned.
//! - **Tolerant** ([`parse_with_recovery`]): each recoverable error is handed
//!   to a callback, the parser skips to the next `;`, and a best-effort tree
//!   is returned. Terminal errors (input ending mid-statement, unterminated
//!   literals) are still returned as `Err`.
//!
//! ## Usage
//!
//! ```rust
//! use trilogy_studio_grammar::parse_with_recovery;
//!
//! let mut errors = Vec::new();
//! let tree = parse_with_recovery("key id int;\nselect ,;\nselect id;", &mut |e| {
//!     errors.push(e.clone());
//!     true
//! })
//! .unwrap();
//!
//! assert_eq!(tree.statements.len(), 2);
//! assert_eq!(errors.len(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;
pub mod syntax;
pub mod token;

pub use error::{MAX_EXPR_DEPTH, SyntaxError, SyntaxResult};
pub use parser::{ErrorCallback, Parser};
pub use span::{Position, Span};
pub use syntax::*;

/// Parse `text`, failing on the first syntax error
pub fn parse(text: &str) -> SyntaxResult<ParseTree> {
    Parser::new(text)?.parse()
}

/// Parse `text`, reporting recoverable errors to `on_error`
///
/// Returning `false` from the callback aborts with that error.
pub fn parse_with_recovery(
    text: &str,
    on_error: &mut dyn FnMut(&SyntaxError) -> bool,
) -> SyntaxResult<ParseTree> {
    Parser::new(text)?.with_error_callback(on_error).parse()
}
