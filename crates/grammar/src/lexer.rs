// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lexer
//!
//! Converts source text into [`Token`]s. `#` comments are returned separately
//! so the parser can attach them to declarations as descriptions; `--` and
//! `//` comments are discarded.
//!
//! String literals come in three forms: `'single'`, `"double"` (both with
//! backslash escapes) and `'''triple'''` (raw, may span lines).

use crate::error::{SyntaxError, SyntaxResult};
use crate::span::{Position, Span};
use crate::token::{Comment, Token, TokenKind};

/// Lexer output
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Tokens, always terminated by an `Eof` token
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

struct Cursor<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    idx: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
            idx: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.idx + n).map(|(_, c)| *c)
    }

    fn position(&self) -> Position {
        let offset = self
            .chars
            .get(self.idx)
            .map(|(o, _)| *o)
            .unwrap_or(self.text.len());
        Position::new(self.line, self.column, offset)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = *self.chars.get(self.idx)?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, p)| self.peek_at(i) == Some(p))
    }
}

/// Tokenize `text`
///
/// Fails only on unterminated string literals or quoted identifiers; unknown
/// characters become [`TokenKind::Unknown`] tokens for the parser to report.
pub fn tokenize(text: &str) -> SyntaxResult<Lexed> {
    let mut cursor = Cursor::new(text);
    let mut lexed = Lexed::default();

    while let Some(c) = cursor.peek() {
        let start = cursor.position();

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        if c == '#' {
            cursor.bump();
            let body = cursor.eat_while(|c| c != '\n');
            lexed.comments.push(Comment {
                text: body.trim().to_string(),
                span: Span::new(start, cursor.position()),
            });
            continue;
        }

        if cursor.starts_with("--") || cursor.starts_with("//") {
            cursor.eat_while(|c| c != '\n');
            continue;
        }

        let token = match c {
            '\'' if cursor.starts_with("'''") => lex_triple_string(&mut cursor, start)?,
            '\'' | '"' => lex_string(&mut cursor, start, c)?,
            '`' => lex_quoted_ident(&mut cursor, start)?,
            c if c.is_ascii_digit() => lex_number(&mut cursor, start),
            c if c.is_alphabetic() || c == '_' => {
                let text = cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
                Token::new(TokenKind::Ident, text, Span::new(start, cursor.position()))
            }
            _ => lex_punct(&mut cursor, start),
        };
        lexed.tokens.push(token);
    }

    let end = cursor.position();
    lexed
        .tokens
        .push(Token::new(TokenKind::Eof, "", Span::new(end, end)));
    Ok(lexed)
}

fn lex_triple_string(cursor: &mut Cursor<'_>, start: Position) -> SyntaxResult<Token> {
    for _ in 0..3 {
        cursor.bump();
    }
    let mut value = String::new();
    loop {
        if cursor.starts_with("'''") {
            for _ in 0..3 {
                cursor.bump();
            }
            return Ok(Token::new(
                TokenKind::String,
                value,
                Span::new(start, cursor.position()),
            ));
        }
        match cursor.bump() {
            Some(c) => value.push(c),
            None => {
                return Err(SyntaxError::Unterminated {
                    kind: "string literal",
                    span: Span::new(start, cursor.position()),
                });
            }
        }
    }
}

fn lex_string(cursor: &mut Cursor<'_>, start: Position, quote: char) -> SyntaxResult<Token> {
    cursor.bump();
    let mut value = String::new();
    loop {
        match cursor.bump() {
            Some('\\') => match cursor.bump() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some(other) => value.push(other),
                None => break,
            },
            Some(c) if c == quote => {
                return Ok(Token::new(
                    TokenKind::String,
                    value,
                    Span::new(start, cursor.position()),
                ));
            }
            Some(c) => value.push(c),
            None => break,
        }
    }
    Err(SyntaxError::Unterminated {
        kind: "string literal",
        span: Span::new(start, cursor.position()),
    })
}

fn lex_quoted_ident(cursor: &mut Cursor<'_>, start: Position) -> SyntaxResult<Token> {
    cursor.bump();
    let value = cursor.eat_while(|c| c != '`');
    if cursor.bump() != Some('`') {
        return Err(SyntaxError::Unterminated {
            kind: "quoted identifier",
            span: Span::new(start, cursor.position()),
        });
    }
    Ok(Token::new(
        TokenKind::QuotedIdent,
        value,
        Span::new(start, cursor.position()),
    ))
}

fn lex_number(cursor: &mut Cursor<'_>, start: Position) -> Token {
    let mut text = cursor.eat_while(|c| c.is_ascii_digit());
    let mut kind = TokenKind::Integer;
    if cursor.peek() == Some('.') && cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
        cursor.bump();
        text.push('.');
        text.push_str(&cursor.eat_while(|c| c.is_ascii_digit()));
        kind = TokenKind::Float;
    }
    Token::new(kind, text, Span::new(start, cursor.position()))
}

fn lex_punct(cursor: &mut Cursor<'_>, start: Position) -> Token {
    const TWO_CHAR: [(&str, TokenKind); 7] = [
        ("::", TokenKind::DoubleColon),
        ("<-", TokenKind::Arrow),
        ("<=", TokenKind::LtEq),
        ("<>", TokenKind::NotEq),
        (">=", TokenKind::GtEq),
        ("!=", TokenKind::NotEq),
        ("==", TokenKind::Eq),
    ];

    for (pattern, kind) in TWO_CHAR {
        if cursor.starts_with(pattern) {
            cursor.bump();
            cursor.bump();
            return Token::new(kind, pattern, Span::new(start, cursor.position()));
        }
    }

    let c = cursor.bump().unwrap_or_default();
    let kind = match c {
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '.' => TokenKind::Dot,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '=' => TokenKind::Eq,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        _ => TokenKind::Unknown,
    };
    Token::new(kind, c.to_string(), Span::new(start, cursor.position()))
}
