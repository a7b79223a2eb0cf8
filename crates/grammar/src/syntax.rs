// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax tree
//!
//! Untyped output of the parser. Names are kept exactly as written (dotted
//! paths are joined with `.`); resolving them against an Environment is the
//! job of semantic analysis.

use trilogy_studio_ir::{BinaryOp, UnaryOp};

use crate::span::Span;

/// Parsed document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseTree {
    pub statements: Vec<SyntaxStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxStatement {
    pub kind: StatementSyntax,
    pub span: Span,
    /// `#` comment attached to the statement
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementSyntax {
    Import {
        path: String,
        alias: Option<String>,
    },
    TypeDeclaration {
        name: String,
        base: TypeSyntax,
    },
    Concept(ConceptSyntax),
    Datasource(DatasourceSyntax),
    Select(SelectSyntax),
    MultiSelect(MultiSelectSyntax),
    Persist {
        name: String,
        address: String,
        select: SelectSyntax,
    },
    Show(ShowSyntax),
    Validate,
    RawSql(String),
}

/// `base[::trait]*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    pub base: String,
    pub traits: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConceptKeyword {
    Key,
    Property,
    Metric,
    Auto,
    Const,
}

impl ConceptKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConceptKeyword::Key => "key",
            ConceptKeyword::Property => "property",
            ConceptKeyword::Metric => "metric",
            ConceptKeyword::Auto => "auto",
            ConceptKeyword::Const => "const",
        }
    }
}

/// `key|property|metric|auto|const` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptSyntax {
    pub keyword: ConceptKeyword,
    /// Keys a property hangs off
    pub keys: Vec<String>,
    pub name: String,
    pub name_span: Span,
    pub datatype: Option<TypeSyntax>,
    pub lineage: Option<ExprSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSyntax {
    pub column: String,
    pub concept: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceSyntax {
    pub name: String,
    pub columns: Vec<ColumnSyntax>,
    pub grain: Vec<String>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItemSyntax {
    pub expr: ExprSyntax,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSyntax {
    pub expr: ExprSyntax,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectSyntax {
    pub items: Vec<SelectItemSyntax>,
    /// WHERE clauses before and after SELECT, joined with `and`
    pub where_clause: Option<ExprSyntax>,
    pub having: Option<ExprSyntax>,
    pub order_by: Vec<OrderSyntax>,
    pub limit: Option<u64>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignSyntax {
    pub name: String,
    pub concepts: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelectSyntax {
    pub selects: Vec<SelectSyntax>,
    pub align: Vec<AlignSyntax>,
    pub order_by: Vec<OrderSyntax>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowSyntax {
    Select(SelectSyntax),
    Concepts,
    Datasources,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralSyntax {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprSyntax {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Possibly dotted concept reference
    Ref(String),
    Literal(LiteralSyntax),
    Binary {
        left: Box<ExprSyntax>,
        op: BinaryOp,
        right: Box<ExprSyntax>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<ExprSyntax>,
    },
    Call {
        name: String,
        args: Vec<ExprSyntax>,
    },
    Paren(Box<ExprSyntax>),
    IsNull {
        expr: Box<ExprSyntax>,
        negated: bool,
    },
    InList {
        expr: Box<ExprSyntax>,
        list: Vec<ExprSyntax>,
        negated: bool,
    },
    Case {
        whens: Vec<(ExprSyntax, ExprSyntax)>,
        else_result: Option<Box<ExprSyntax>>,
    },
    Cast {
        expr: Box<ExprSyntax>,
        datatype: TypeSyntax,
    },
}

impl ExprSyntax {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}
