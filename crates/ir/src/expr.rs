// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents resolved expressions in the IR.
//!
//! ## Design
//!
//! Expressions appear as concept lineage, in WHERE/HAVING conditionals and
//! in ORDER BY items. They can represent:
//!
//! - **Concept references**: fully-qualified `namespace.name` addresses
//! - **Literal values**: Numbers, strings, booleans, NULL
//! - **Binary operations**: Arithmetic, comparison, logical, string operations
//! - **Unary operations**: Negation, NOT
//! - **Function calls**: Built-in aggregates and scalar functions
//! - **Case expressions**: Conditional logic (CASE WHEN...THEN...ELSE)
//! - **Cast expressions**: Type conversions
//! - **Null checks and lists**: `x is null`, `x in (1, 2)`
//!
//! ## Expression Hierarchy
//!
//! ```text
//! BinaryOp {
//!   left: Box<Expr::Concept("local.price")>,
//!   op: Mul,
//!   right: Box<Expr::Literal(1.1)>
//! }
//! ```
//!
//! Represents: `price * 1.1`
//!
//! ## Rendering
//!
//! `Display` renders the expression back to query-language text. Concepts in
//! the default namespace print as bare names; everything else prints as its
//! full address. The rendered text is what completion items report as their
//! calculation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::concept::{DEFAULT_NAMESPACE, split_address};

/// A resolved expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Concept reference
    Concept(ConceptRef),

    /// Literal value
    Literal(Literal),

    /// Binary operation (e.g., `a + b`, `x = 5`)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation (e.g., `-x`, `not a`)
    UnaryOp { op: UnaryOp, expr: Box<Expr> },

    /// Function call (e.g., `count(order_id)`, `upper(name)`)
    Function { name: String, args: Vec<Expr> },

    /// CASE expression
    Case {
        conditions: Vec<Expr>,
        results: Vec<Expr>,
        else_result: Option<Box<Expr>>,
    },

    /// CAST expression
    Cast { expr: Box<Expr>, type_name: String },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// `expr is [not] null`
    IsNull { expr: Box<Expr>, negated: bool },

    /// `expr [not] in (a, b, ...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
}

/// Reference to a concept by address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptRef {
    pub address: String,
}

impl ConceptRef {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        split_address(&self.address).0
    }

    pub fn name(&self) -> &str {
        split_address(&self.address).1
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Like,
    NotLike,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Like => "like",
            BinaryOp::NotLike => "not like",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Like
                | BinaryOp::NotLike
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::Like
            | BinaryOp::NotLike => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl Expr {
    pub fn concept(address: impl Into<String>) -> Self {
        Expr::Concept(ConceptRef::new(address))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Conjunction of two conditionals, each side parenthesized
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::binary(left.parenthesized(), BinaryOp::And, right.parenthesized())
    }

    /// Wrap in parentheses unless already atomic
    pub fn parenthesized(self) -> Self {
        match self {
            Expr::Paren(_) | Expr::Concept(_) | Expr::Literal(_) | Expr::Function { .. } => self,
            other => Expr::Paren(Box::new(other)),
        }
    }

    /// Split a conditional into its top-level AND conjuncts
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::BinaryOp {
                left,
                op: BinaryOp::And,
                right,
            } => {
                let mut out = left.conjuncts();
                out.extend(right.conjuncts());
                out
            }
            Expr::Paren(inner) if matches!(**inner, Expr::BinaryOp { op: BinaryOp::And, .. }) => {
                inner.conjuncts()
            }
            other => vec![other],
        }
    }

    /// Visit every concept reference in the tree
    pub fn visit_concepts<F: FnMut(&ConceptRef)>(&self, f: &mut F) {
        match self {
            Expr::Concept(c) => f(c),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.visit_concepts(f);
                right.visit_concepts(f);
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Cast { expr, .. }
            | Expr::Paren(expr)
            | Expr::IsNull { expr, .. } => expr.visit_concepts(f),
            Expr::Function { args, .. } => args.iter().for_each(|a| a.visit_concepts(f)),
            Expr::Case {
                conditions,
                results,
                else_result,
            } => {
                conditions.iter().for_each(|c| c.visit_concepts(f));
                results.iter().for_each(|r| r.visit_concepts(f));
                if let Some(e) = else_result {
                    e.visit_concepts(f);
                }
            }
            Expr::InList { expr, list, .. } => {
                expr.visit_concepts(f);
                list.iter().for_each(|e| e.visit_concepts(f));
            }
        }
    }

    /// Mutably visit every concept reference in the tree
    pub fn map_concepts<F: FnMut(&mut ConceptRef)>(&mut self, f: &mut F) {
        match self {
            Expr::Concept(c) => f(c),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.map_concepts(f);
                right.map_concepts(f);
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Cast { expr, .. }
            | Expr::Paren(expr)
            | Expr::IsNull { expr, .. } => expr.map_concepts(f),
            Expr::Function { args, .. } => args.iter_mut().for_each(|a| a.map_concepts(f)),
            Expr::Case {
                conditions,
                results,
                else_result,
            } => {
                conditions.iter_mut().for_each(|c| c.map_concepts(f));
                results.iter_mut().for_each(|r| r.map_concepts(f));
                if let Some(e) = else_result {
                    e.map_concepts(f);
                }
            }
            Expr::InList { expr, list, .. } => {
                expr.map_concepts(f);
                list.iter_mut().for_each(|e| e.map_concepts(f));
            }
        }
    }

    /// Replace concept references for which `f` returns an expression
    pub fn substitute_concepts<F: FnMut(&ConceptRef) -> Option<Expr>>(&mut self, f: &mut F) {
        match self {
            Expr::Concept(c) => {
                if let Some(replacement) = f(c) {
                    *self = replacement;
                }
            }
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.substitute_concepts(f);
                right.substitute_concepts(f);
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Cast { expr, .. }
            | Expr::Paren(expr)
            | Expr::IsNull { expr, .. } => expr.substitute_concepts(f),
            Expr::Function { args, .. } => args.iter_mut().for_each(|a| a.substitute_concepts(f)),
            Expr::Case {
                conditions,
                results,
                else_result,
            } => {
                conditions.iter_mut().for_each(|c| c.substitute_concepts(f));
                results.iter_mut().for_each(|r| r.substitute_concepts(f));
                if let Some(e) = else_result {
                    e.substitute_concepts(f);
                }
            }
            Expr::InList { expr, list, .. } => {
                expr.substitute_concepts(f);
                list.iter_mut().for_each(|e| e.substitute_concepts(f));
            }
        }
    }

    /// Distinct concept addresses, in first-seen order
    pub fn concept_addresses(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        self.visit_concepts(&mut |c| {
            if !out.contains(&c.address) {
                out.push(c.address.clone());
            }
        });
        out
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::String(s) => {
                write!(f, "'")?;
                for ch in s.chars() {
                    match ch {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

impl fmt::Display for ConceptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace() == DEFAULT_NAMESPACE {
            f.write_str(self.name())
        } else {
            f.write_str(&self.address)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Concept(c) => write!(f, "{}", c),
            Expr::Literal(l) => write!(f, "{}", l),
            Expr::BinaryOp { left, op, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::UnaryOp { op, expr } => match op {
                UnaryOp::Neg => write!(f, "-{}", expr),
                UnaryOp::Not => write!(f, "not {}", expr),
            },
            Expr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Case {
                conditions,
                results,
                else_result,
            } => {
                write!(f, "CASE")?;
                for (cond, result) in conditions.iter().zip(results) {
                    write!(f, " WHEN {} THEN {}", cond, result)?;
                }
                if let Some(e) = else_result {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
            Expr::Cast { expr, type_name } => write!(f, "cast({} as {})", expr, type_name),
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::IsNull { expr, negated } => {
                write!(f, "{} is {}null", expr, if *negated { "not " } else { "" })
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                write!(f, "{} {}in (", expr, if *negated { "not " } else { "" })?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
