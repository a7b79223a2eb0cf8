// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statement parser
//!
//! Recursive descent over the token stream, with a Pratt loop for
//! expressions. Each statement ends with `;`, which is also the
//! resynchronization point in tolerant mode:
//!
//! 1. A recoverable error is handed to the error callback.
//! 2. If the callback returns `true`, tokens are skipped through the next `;`
//!    and parsing resumes with the following statement.
//! 3. If it returns `false` (or no callback is installed) the error is
//!    returned.
//!
//! Terminal errors (see [`SyntaxError::is_terminal`]) are always returned.

use tracing::debug;
use trilogy_studio_ir::{BinaryOp, UnaryOp};

use crate::error::{MAX_EXPR_DEPTH, SyntaxError, SyntaxResult};
use crate::lexer::tokenize;
use crate::span::Span;
use crate::syntax::*;
use crate::token::{Comment, Token, TokenKind};

/// Callback invoked for each recoverable error; return `true` to continue
pub type ErrorCallback<'cb> = &'cb mut dyn FnMut(&SyntaxError) -> bool;

const STATEMENT_STARTERS: &[&str] = &[
    "import",
    "type",
    "key",
    "property",
    "metric",
    "auto",
    "const",
    "datasource",
    "SELECT",
    "WHERE",
    "PERSIST",
    "SHOW",
    "VALIDATE",
    "raw_sql",
];

/// Words that cannot be used as bare concept references
const RESERVED: &[&str] = &[
    "select", "where", "having", "order", "limit", "merge", "align", "as", "and", "or", "not",
    "in", "is", "like", "when", "then", "else", "end",
];

/// Keywords that close a select item list
const CLAUSE_KEYWORDS: &[&str] = &["where", "having", "order", "limit", "merge", "align"];

pub struct Parser<'cb> {
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    pos: usize,
    depth: usize,
    on_error: Option<ErrorCallback<'cb>>,
}

impl<'cb> Parser<'cb> {
    /// Tokenize `text` and prepare a strict parser
    pub fn new(text: &str) -> SyntaxResult<Self> {
        let lexed = tokenize(text)?;
        Ok(Self {
            tokens: lexed.tokens,
            comments: lexed.comments,
            pos: 0,
            depth: 0,
            on_error: None,
        })
    }

    /// Switch to tolerant mode
    pub fn with_error_callback(mut self, on_error: ErrorCallback<'cb>) -> Self {
        self.on_error = Some(on_error);
        self
    }

    pub fn parse(mut self) -> SyntaxResult<ParseTree> {
        let mut tree = ParseTree::default();
        loop {
            while self.eat(TokenKind::Semicolon).is_some() {}
            if self.check(TokenKind::Eof) {
                break;
            }

            match self.parse_statement() {
                Ok(statement) => tree.statements.push(statement),
                Err(error) if error.is_terminal() => return Err(error),
                Err(error) => {
                    let resume = match self.on_error.as_mut() {
                        Some(callback) => callback(&error),
                        None => false,
                    };
                    if !resume {
                        return Err(error);
                    }
                    debug!(%error, "recovering from syntax error");
                    self.synchronize();
                }
            }
        }
        Ok(tree)
    }

    fn synchronize(&mut self) {
        while !self.check(TokenKind::Eof) {
            if self.advance().kind == TokenKind::Semicolon {
                break;
            }
        }
    }

    // ----- token helpers -----

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.advance())
    }

    fn eat_keyword(&mut self, keyword: &str) -> Option<Token> {
        self.check_keyword(keyword).then(|| self.advance())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> SyntaxResult<Token> {
        self.eat(kind).ok_or_else(|| self.unexpected(&[what]))
    }

    fn expect_keyword(&mut self, keyword: &str) -> SyntaxResult<Token> {
        self.eat_keyword(keyword)
            .ok_or_else(|| self.unexpected(&[keyword]))
    }

    fn unexpected(&self, expected: &[&str]) -> SyntaxError {
        let token = self.peek();
        let expected = expected.iter().map(|s| s.to_string()).collect();
        match token.kind {
            TokenKind::Eof => SyntaxError::UnexpectedEof {
                expected,
                span: token.span,
            },
            _ => SyntaxError::UnexpectedToken {
                found: token.describe(),
                expected,
                span: token.span,
            },
        }
    }

    fn is_reserved(token: &Token) -> bool {
        RESERVED.iter().any(|kw| token.is_keyword(kw))
    }

    /// A single identifier usable as a name
    fn expect_name(&mut self, what: &str) -> SyntaxResult<Token> {
        if self.check(TokenKind::Ident) && !Self::is_reserved(self.peek()) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[what]))
        }
    }

    /// `ident(.ident)*`
    fn parse_path(&mut self, what: &str) -> SyntaxResult<(String, Span)> {
        let first = self.expect_name(what)?;
        let mut path = first.text;
        let mut span = first.span;
        while self.check(TokenKind::Dot) {
            self.advance();
            let part = self.expect_name(what)?;
            path.push('.');
            path.push_str(&part.text);
            span = span.to(part.span);
        }
        Ok((path, span))
    }

    /// Physical address: backtick-quoted, string, or dotted path
    fn parse_address(&mut self) -> SyntaxResult<String> {
        if let Some(token) = self.eat(TokenKind::QuotedIdent) {
            return Ok(token.text);
        }
        if let Some(token) = self.eat(TokenKind::String) {
            return Ok(token.text);
        }
        Ok(self.parse_path("address")?.0)
    }

    // ----- statements -----

    fn parse_statement(&mut self) -> SyntaxResult<SyntaxStatement> {
        let start_idx = self.pos;
        let start = self.peek().span;
        let head = self.peek().clone();
        if head.kind != TokenKind::Ident {
            return Err(self.unexpected(STATEMENT_STARTERS));
        }

        let kind = match head.text.to_ascii_lowercase().as_str() {
            "import" => self.parse_import()?,
            "type" => self.parse_type_declaration()?,
            "key" => self.parse_concept(ConceptKeyword::Key)?,
            "property" => self.parse_concept(ConceptKeyword::Property)?,
            "metric" => self.parse_concept(ConceptKeyword::Metric)?,
            "auto" => self.parse_concept(ConceptKeyword::Auto)?,
            "const" => self.parse_concept(ConceptKeyword::Const)?,
            "datasource" => self.parse_datasource()?,
            "select" | "where" => self.parse_selection()?,
            "persist" => self.parse_persist()?,
            "show" => self.parse_show()?,
            "validate" => {
                self.advance();
                self.expect_keyword("all")?;
                StatementSyntax::Validate
            }
            "raw_sql" => self.parse_raw_sql()?,
            _ => return Err(self.unexpected(STATEMENT_STARTERS)),
        };

        let end = self.expect(TokenKind::Semicolon, ";")?;
        let span = start.to(end.span);
        let comment = self.comment_for(start_idx, span);
        Ok(SyntaxStatement {
            kind,
            span,
            comment,
        })
    }

    /// Trailing `#` comment on the terminator's line, else the comment
    /// lines directly above the statement
    fn comment_for(&self, start_idx: usize, span: Span) -> Option<String> {
        let next_offset = self.peek().span.start.offset;
        if let Some(trailing) = self.comments.iter().find(|c| {
            c.span.start.line == span.end.line
                && c.span.start.offset >= span.end.offset
                && c.span.start.offset <= next_offset
        }) {
            return Some(trailing.text.clone());
        }

        let floor = match start_idx {
            0 => 0,
            idx => self.tokens[idx - 1].span.end.line,
        };
        let mut lines = Vec::new();
        let mut line = span.start.line;
        while line > floor + 1 {
            line -= 1;
            match self.comments.iter().find(|c| c.span.start.line == line) {
                Some(comment) => lines.push(comment.text.as_str()),
                None => break,
            }
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join(" "))
    }

    fn parse_import(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        let (path, _) = self.parse_path("module path")?;
        let alias = match self.eat_keyword("as") {
            Some(_) => Some(self.expect_name("alias")?.text),
            None => None,
        };
        Ok(StatementSyntax::Import { path, alias })
    }

    fn parse_type_declaration(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        let name = self.expect_name("type name")?.text;
        let base = self.parse_type()?;
        Ok(StatementSyntax::TypeDeclaration { name, base })
    }

    fn parse_type(&mut self) -> SyntaxResult<TypeSyntax> {
        let base = self.expect_name("datatype")?;
        let mut span = base.span;
        let mut traits = Vec::new();
        while self.eat(TokenKind::DoubleColon).is_some() {
            let t = self.expect_name("trait name")?;
            span = span.to(t.span);
            traits.push(t.text);
        }
        Ok(TypeSyntax {
            base: base.text,
            traits,
            span,
        })
    }

    fn parse_concept(&mut self, keyword: ConceptKeyword) -> SyntaxResult<StatementSyntax> {
        self.advance();

        let (keys, name, name_span) = if keyword == ConceptKeyword::Property {
            self.parse_property_target()?
        } else {
            let token = self.expect_name("concept name")?;
            (Vec::new(), token.text, token.span)
        };

        let mut datatype = None;
        let mut lineage = None;
        if self.eat(TokenKind::Arrow).is_some() {
            lineage = Some(self.parse_expr()?);
        } else {
            match keyword {
                ConceptKeyword::Key | ConceptKeyword::Property => {
                    datatype = Some(self.parse_type()?);
                }
                _ => return Err(self.unexpected(&["<-"])),
            }
        }

        Ok(StatementSyntax::Concept(ConceptSyntax {
            keyword,
            keys,
            name,
            name_span,
            datatype,
            lineage,
        }))
    }

    /// `key.name`, `<k1, k2>.name`, `(k1, k2).name` or a bare `name`
    fn parse_property_target(&mut self) -> SyntaxResult<(Vec<String>, String, Span)> {
        let close = if self.check(TokenKind::Lt) {
            Some(TokenKind::Gt)
        } else if self.check(TokenKind::LParen) {
            Some(TokenKind::RParen)
        } else {
            None
        };

        if let Some(close) = close {
            self.advance();
            let mut keys = vec![self.parse_path("key")?.0];
            while self.eat(TokenKind::Comma).is_some() {
                keys.push(self.parse_path("key")?.0);
            }
            self.expect(close, if close == TokenKind::Gt { ">" } else { ")" })?;
            self.expect(TokenKind::Dot, ".")?;
            let name = self.expect_name("property name")?;
            return Ok((keys, name.text, name.span));
        }

        let (path, span) = self.parse_path("property name")?;
        match path.rsplit_once('.') {
            Some((key, name)) => Ok((vec![key.to_string()], name.to_string(), span)),
            None => Ok((Vec::new(), path, span)),
        }
    }

    fn parse_datasource(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        let name = self.expect_name("datasource name")?.text;
        self.expect(TokenKind::LParen, "(")?;

        let mut columns = Vec::new();
        while !self.check(TokenKind::RParen) {
            let column = match self.eat(TokenKind::QuotedIdent) {
                Some(token) => token,
                None => self.expect_name("column name")?,
            };
            let concept = if self.eat(TokenKind::Colon).is_some() {
                self.parse_path("concept")?
            } else {
                (column.text.clone(), column.span)
            };
            columns.push(ColumnSyntax {
                column: column.text,
                concept: concept.0,
                span: column.span.to(concept.1),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;

        let mut grain = Vec::new();
        let mut address = None;
        loop {
            if self.eat_keyword("grain").is_some() {
                self.expect(TokenKind::LParen, "(")?;
                grain.push(self.parse_path("concept")?.0);
                while self.eat(TokenKind::Comma).is_some() {
                    grain.push(self.parse_path("concept")?.0);
                }
                self.expect(TokenKind::RParen, ")")?;
            } else if self.eat_keyword("address").is_some() {
                address = Some(self.parse_address()?);
            } else {
                break;
            }
        }

        let address = match address {
            Some(address) => address,
            None => return Err(self.unexpected(&["address", "grain"])),
        };

        Ok(StatementSyntax::Datasource(DatasourceSyntax {
            name,
            columns,
            grain,
            address,
        }))
    }

    fn parse_selection(&mut self) -> SyntaxResult<StatementSyntax> {
        let first = self.parse_select()?;
        if !self.check_keyword("merge") {
            return Ok(StatementSyntax::Select(first));
        }

        let mut selects = vec![first];
        while self.eat_keyword("merge").is_some() {
            selects.push(self.parse_select()?);
        }
        self.expect_keyword("align")?;
        let align = self.parse_align()?;
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(StatementSyntax::MultiSelect(MultiSelectSyntax {
            selects,
            align,
            order_by,
            limit,
        }))
    }

    fn parse_select(&mut self) -> SyntaxResult<SelectSyntax> {
        let start = self.peek().span;
        let mut where_clause = None;
        if self.eat_keyword("where").is_some() {
            where_clause = Some(self.parse_expr()?);
        }

        self.expect_keyword("select")?;
        let items = self.parse_select_items()?;

        if self.eat_keyword("where").is_some() {
            let post = self.parse_expr()?;
            where_clause = Some(match where_clause {
                Some(pre) => conjunction(pre, post),
                None => post,
            });
        }

        let having = match self.eat_keyword("having") {
            Some(_) => Some(self.parse_expr()?),
            None => None,
        };
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(SelectSyntax {
            items,
            where_clause,
            having,
            order_by,
            limit,
            span: start.to(self.previous_span()),
        })
    }

    fn at_clause_end(&self) -> bool {
        self.check(TokenKind::Semicolon)
            || self.check(TokenKind::Eof)
            || CLAUSE_KEYWORDS.iter().any(|kw| self.check_keyword(kw))
    }

    fn parse_select_items(&mut self) -> SyntaxResult<Vec<SelectItemSyntax>> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let mut span = expr.span;
            let alias = match self.eat_keyword("as") {
                Some(_) => {
                    let name = self.expect_name("alias")?;
                    span = span.to(name.span);
                    Some(name.text)
                }
                None => None,
            };
            items.push(SelectItemSyntax { expr, alias, span });

            if self.eat(TokenKind::Comma).is_none() || self.at_clause_end() {
                break;
            }
        }
        Ok(items)
    }

    fn parse_align(&mut self) -> SyntaxResult<Vec<AlignSyntax>> {
        let mut items = Vec::new();
        loop {
            let name = self.expect_name("alignment name")?;
            self.expect(TokenKind::Colon, ":")?;
            let (first, mut span) = self.parse_path("concept")?;
            let mut concepts = vec![first];
            while self.check(TokenKind::Comma)
                && !(self.peek_nth(1).kind == TokenKind::Ident
                    && self.peek_nth(2).kind == TokenKind::Colon)
            {
                self.advance();
                let (next, next_span) = self.parse_path("concept")?;
                concepts.push(next);
                span = span.to(next_span);
            }
            items.push(AlignSyntax {
                name: name.text,
                concepts,
                span: name.span.to(span),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(items)
    }

    fn parse_order_by(&mut self) -> SyntaxResult<Vec<OrderSyntax>> {
        let mut items = Vec::new();
        if self.eat_keyword("order").is_none() {
            return Ok(items);
        }
        self.expect_keyword("by")?;
        loop {
            let expr = self.parse_expr()?;
            let descending = if self.eat_keyword("desc").is_some() {
                true
            } else {
                self.eat_keyword("asc");
                false
            };
            items.push(OrderSyntax { expr, descending });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(items)
    }

    fn parse_limit(&mut self) -> SyntaxResult<Option<u64>> {
        if self.eat_keyword("limit").is_none() {
            return Ok(None);
        }
        let token = self.expect(TokenKind::Integer, "integer")?;
        token
            .text
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SyntaxError::InvalidNumber {
                text: token.text.clone(),
                span: token.span,
            })
    }

    fn parse_persist(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        let name = self.expect_name("persist name")?.text;
        self.expect_keyword("into")?;
        let address = self.parse_address()?;
        self.expect_keyword("from")?;
        let select = self.parse_select()?;
        Ok(StatementSyntax::Persist {
            name,
            address,
            select,
        })
    }

    fn parse_show(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        let target = if self.eat_keyword("concepts").is_some() {
            ShowSyntax::Concepts
        } else if self.eat_keyword("datasources").is_some() {
            ShowSyntax::Datasources
        } else if self.check_keyword("select") || self.check_keyword("where") {
            ShowSyntax::Select(self.parse_select()?)
        } else {
            return Err(self.unexpected(&["CONCEPTS", "DATASOURCES", "SELECT", "WHERE"]));
        };
        Ok(StatementSyntax::Show(target))
    }

    fn parse_raw_sql(&mut self) -> SyntaxResult<StatementSyntax> {
        self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let text = self.expect(TokenKind::String, "string")?.text;
        self.expect(TokenKind::RParen, ")")?;
        Ok(StatementSyntax::RawSql(text))
    }

    // ----- expressions -----

    pub fn parse_expr(&mut self) -> SyntaxResult<ExprSyntax> {
        self.parse_binary(BinaryOp::Or.precedence())
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        let token = self.peek();
        let op = match token.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Ident if token.is_keyword("and") => BinaryOp::And,
            TokenKind::Ident if token.is_keyword("or") => BinaryOp::Or,
            TokenKind::Ident if token.is_keyword("like") => BinaryOp::Like,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, min_prec: u8) -> SyntaxResult<ExprSyntax> {
        let comparison = BinaryOp::Eq.precedence();
        let mut left = self.parse_unary()?;

        loop {
            if comparison >= min_prec {
                if self.check_keyword("is") {
                    self.advance();
                    let negated = self.eat_keyword("not").is_some();
                    let null = self.expect_keyword("null")?;
                    let span = left.span.to(null.span);
                    left = ExprSyntax::new(
                        ExprKind::IsNull {
                            expr: Box::new(left),
                            negated,
                        },
                        span,
                    );
                    continue;
                }

                let negated = self.check_keyword("not");
                let is_in = self.peek_nth(usize::from(negated)).is_keyword("in");
                let is_not_like = negated && self.peek_nth(1).is_keyword("like");
                if is_in {
                    if negated {
                        self.advance();
                    }
                    self.advance();
                    left = self.parse_in_list(left, negated)?;
                    continue;
                }
                if is_not_like {
                    self.advance();
                    self.advance();
                    let right = self.parse_binary(comparison + 1)?;
                    left = binary(left, BinaryOp::NotLike, right);
                    continue;
                }
            }

            let Some(op) = self.peek_binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_in_list(&mut self, left: ExprSyntax, negated: bool) -> SyntaxResult<ExprSyntax> {
        self.expect(TokenKind::LParen, "(")?;
        let mut list = Vec::new();
        if !self.check(TokenKind::RParen) {
            list.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                list.push(self.parse_expr()?);
            }
        }
        let close = self.expect(TokenKind::RParen, ")")?;
        let span = left.span.to(close.span);
        Ok(ExprSyntax::new(
            ExprKind::InList {
                expr: Box::new(left),
                list,
                negated,
            },
            span,
        ))
    }

    /// Depth-guarded entry point for every nested expression
    fn parse_unary(&mut self) -> SyntaxResult<ExprSyntax> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(SyntaxError::NestingTooDeep {
                limit: MAX_EXPR_DEPTH,
                span: self.peek().span,
            });
        }
        self.depth += 1;
        let result = self.parse_unary_inner();
        self.depth -= 1;
        result
    }

    fn parse_unary_inner(&mut self) -> SyntaxResult<ExprSyntax> {
        if let Some(minus) = self.eat(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            let span = minus.span.to(operand.span);
            return Ok(ExprSyntax::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(operand),
                },
                span,
            ));
        }
        if let Some(not) = self.eat_keyword("not") {
            let operand = self.parse_binary(BinaryOp::Eq.precedence())?;
            let span = not.span.to(operand.span);
            return Ok(ExprSyntax::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> SyntaxResult<ExprSyntax> {
        let token = self.peek().clone();
        let literal = |value: LiteralSyntax| -> SyntaxResult<ExprSyntax> {
            Ok(ExprSyntax::new(ExprKind::Literal(value), token.span))
        };

        match token.kind {
            TokenKind::Integer => {
                self.advance();
                match token.text.parse::<i64>() {
                    Ok(value) => literal(LiteralSyntax::Integer(value)),
                    Err(_) => Err(SyntaxError::InvalidNumber {
                        text: token.text.clone(),
                        span: token.span,
                    }),
                }
            }
            TokenKind::Float => {
                self.advance();
                match token.text.parse::<f64>() {
                    Ok(value) => literal(LiteralSyntax::Float(value)),
                    Err(_) => Err(SyntaxError::InvalidNumber {
                        text: token.text.clone(),
                        span: token.span,
                    }),
                }
            }
            TokenKind::String => {
                self.advance();
                literal(LiteralSyntax::String(token.text.clone()))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen, ")")?;
                Ok(ExprSyntax::new(
                    ExprKind::Paren(Box::new(inner)),
                    token.span.to(close.span),
                ))
            }
            TokenKind::Ident if token.is_keyword("true") => {
                self.advance();
                literal(LiteralSyntax::Boolean(true))
            }
            TokenKind::Ident if token.is_keyword("false") => {
                self.advance();
                literal(LiteralSyntax::Boolean(false))
            }
            TokenKind::Ident if token.is_keyword("null") => {
                self.advance();
                literal(LiteralSyntax::Null)
            }
            TokenKind::Ident if token.is_keyword("case") => self.parse_case(),
            TokenKind::Ident
                if token.is_keyword("cast") && self.peek_nth(1).kind == TokenKind::LParen =>
            {
                self.parse_cast()
            }
            TokenKind::Ident
                if !Self::is_reserved(&token) && self.peek_nth(1).kind == TokenKind::LParen =>
            {
                self.parse_call()
            }
            TokenKind::Ident if !Self::is_reserved(&token) => {
                let (path, span) = self.parse_path("concept")?;
                Ok(ExprSyntax::new(ExprKind::Ref(path), span))
            }
            _ => Err(self.unexpected(&["expression"])),
        }
    }

    fn parse_call(&mut self) -> SyntaxResult<ExprSyntax> {
        let name = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                args.push(self.parse_expr()?);
            }
        }
        let close = self.expect(TokenKind::RParen, ")")?;
        Ok(ExprSyntax::new(
            ExprKind::Call {
                name: name.text.to_ascii_lowercase(),
                args,
            },
            name.span.to(close.span),
        ))
    }

    fn parse_cast(&mut self) -> SyntaxResult<ExprSyntax> {
        let start = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let expr = self.parse_expr()?;
        self.expect_keyword("as")?;
        let datatype = self.parse_type()?;
        let close = self.expect(TokenKind::RParen, ")")?;
        Ok(ExprSyntax::new(
            ExprKind::Cast {
                expr: Box::new(expr),
                datatype,
            },
            start.span.to(close.span),
        ))
    }

    fn parse_case(&mut self) -> SyntaxResult<ExprSyntax> {
        let start = self.advance();
        let mut whens = Vec::new();
        while self.eat_keyword("when").is_some() {
            let condition = self.parse_expr()?;
            self.expect_keyword("then")?;
            let result = self.parse_expr()?;
            whens.push((condition, result));
        }
        if whens.is_empty() {
            return Err(self.unexpected(&["WHEN"]));
        }
        let else_result = match self.eat_keyword("else") {
            Some(_) => Some(Box::new(self.parse_expr()?)),
            None => None,
        };
        let end = self.expect_keyword("end")?;
        Ok(ExprSyntax::new(
            ExprKind::Case { whens, else_result },
            start.span.to(end.span),
        ))
    }
}

fn binary(left: ExprSyntax, op: BinaryOp, right: ExprSyntax) -> ExprSyntax {
    let span = left.span.to(right.span);
    ExprSyntax::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn parenthesize(expr: ExprSyntax) -> ExprSyntax {
    match expr.kind {
        ExprKind::Paren(_) | ExprKind::Ref(_) | ExprKind::Literal(_) | ExprKind::Call { .. } => {
            expr
        }
        _ => {
            let span = expr.span;
            ExprSyntax::new(ExprKind::Paren(Box::new(expr)), span)
        }
    }
}

/// `(left) and (right)`
pub(crate) fn conjunction(left: ExprSyntax, right: ExprSyntax) -> ExprSyntax {
    binary(parenthesize(left), BinaryOp::And, parenthesize(right))
}
