// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax errors
//!
//! Errors are split into two classes:
//!
//! - **Recoverable**: the parser can resynchronize at the next `;`. In
//!   tolerant mode these are handed to the error callback.
//! - **Terminal**: the input ends mid-statement, a literal never closes, or
//!   an expression nests past [`MAX_EXPR_DEPTH`]. These always abort the
//!   parse.

use thiserror::Error;

use crate::span::Span;

/// Deepest expression nesting the parser accepts
pub const MAX_EXPR_DEPTH: usize = 64;

/// Result type for parsing
pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error(
        "Unexpected token '{found}' at line {}, column {}",
        span.start.line,
        span.start.column
    )]
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
        span: Span,
    },

    #[error("Unexpected end of input, expected one of: {}", expected.join(", "))]
    UnexpectedEof { expected: Vec<String>, span: Span },

    #[error(
        "Unterminated {kind} starting at line {}, column {}",
        span.start.line,
        span.start.column
    )]
    Unterminated { kind: &'static str, span: Span },

    #[error("Invalid number literal '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error(
        "Expression nested deeper than {limit} levels at line {}, column {}",
        span.start.line,
        span.start.column
    )]
    NestingTooDeep { limit: usize, span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEof { span, .. }
            | SyntaxError::Unterminated { span, .. }
            | SyntaxError::InvalidNumber { span, .. }
            | SyntaxError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Terminal errors cannot be recovered from by skipping to the next `;`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyntaxError::UnexpectedEof { .. }
                | SyntaxError::Unterminated { .. }
                | SyntaxError::NestingTooDeep { .. }
        )
    }

    /// Editor-facing message
    pub fn user_message(&self) -> String {
        match self {
            SyntaxError::UnexpectedToken {
                found, expected, ..
            } if !expected.is_empty() => format!(
                "Unexpected token '{}'. Expected one of:\n{{{}}}",
                found,
                expected.join(", ")
            ),
            other => other.to_string(),
        }
    }
}
