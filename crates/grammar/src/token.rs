// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::span::Span;

/// Token categories
///
/// Keywords are lexed as [`TokenKind::Ident`] and recognized by the parser
/// case-insensitively, so concept names may reuse most keyword spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    /// Backtick-quoted identifier or address
    QuotedIdent,
    Integer,
    Float,
    String,

    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    Dot,
    LParen,
    RParen,

    /// `<-`
    Arrow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    /// A character the lexer does not recognize
    Unknown,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, or the decoded value for string literals
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Case-insensitive keyword check
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text.eq_ignore_ascii_case(keyword)
    }

    /// How the token is shown in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::String => format!("'{}'", self.text),
            _ => self.text.clone(),
        }
    }
}

/// A `#` comment, kept aside for descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}
