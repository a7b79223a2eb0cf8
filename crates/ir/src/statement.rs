// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statements
//!
//! Typed statements produced by transforming a parse tree against an
//! Environment. [`Statement`] is a closed union: consumers dispatch with a
//! single exhaustive `match`, so adding a statement kind is checked by the
//! compiler at every dispatch site.
//!
//! ## Selection statements
//!
//! [`SelectStatement`] holds concept addresses rather than expressions.
//! Inline calculations (`sum(revenue) as total`) are declared as locally
//! derived concepts on the Environment and referenced by address; the
//! statement remembers which addresses it declared in `local_concepts`.
//!
//! ```text
//! WHERE region = 'west'
//! SELECT order_date, sum(revenue) as total
//! ORDER BY total desc
//! LIMIT 100;
//! ```
//!
//! [`MultiSelectStatement`] merges several selects and aligns concepts
//! across them; [`PersistStatement`] wraps a select to materialize it.

use serde::{Deserialize, Serialize};

use crate::datatype::{DataType, Purpose};
use crate::expr::Expr;

/// A typed statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Import(ImportStatement),
    Declaration(ConceptDeclaration),
    TypeDeclaration(TypeDeclaration),
    Datasource(DatasourceDeclaration),
    Select(SelectStatement),
    MultiSelect(MultiSelectStatement),
    Persist(PersistStatement),
    Show(ShowStatement),
    Validate(ValidateStatement),
    RawSql(RawSqlStatement),
}

/// Coarse statement categories, used for logging and routing summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Import,
    Declaration,
    Datasource,
    Selection,
    PersistSelection,
    Introspection,
    RawSql,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Import(_) => StatementKind::Import,
            Statement::Declaration(_) | Statement::TypeDeclaration(_) => {
                StatementKind::Declaration
            }
            Statement::Datasource(_) => StatementKind::Datasource,
            Statement::Select(_) | Statement::MultiSelect(_) => StatementKind::Selection,
            Statement::Persist(_) => StatementKind::PersistSelection,
            Statement::Show(_) | Statement::Validate(_) => StatementKind::Introspection,
            Statement::RawSql(_) => StatementKind::RawSql,
        }
    }

    /// Output concept addresses for selection kinds
    pub fn output_components(&self) -> Option<Vec<String>> {
        match self {
            Statement::Select(s) => Some(s.selection.clone()),
            Statement::MultiSelect(m) => Some(m.output_components()),
            Statement::Persist(p) => Some(p.select.selection.clone()),
            _ => None,
        }
    }

    /// Addresses of concepts this statement declared as locally derived
    pub fn local_concepts(&self) -> &[String] {
        match self {
            Statement::Select(s) => &s.local_concepts,
            Statement::MultiSelect(m) => &m.local_concepts,
            Statement::Persist(p) => &p.select.local_concepts,
            Statement::Show(ShowStatement {
                target: ShowTarget::Select(s),
            }) => &s.local_concepts,
            _ => &[],
        }
    }
}

/// `import <path> [as <alias>];`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    pub path: String,
    pub alias: Option<String>,
}

/// A top-level concept declaration; the concept itself lives on the Environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDeclaration {
    pub address: String,
    pub purpose: Purpose,
}

/// `type <name> <base>;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub base: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceDeclaration {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub conditional: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HavingClause {
    pub conditional: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// A single selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Output concept addresses, in projection order
    pub selection: Vec<String>,
    pub where_clause: Option<WhereClause>,
    pub having_clause: Option<HavingClause>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    /// Addresses declared by inline `as` aliases
    pub local_concepts: Vec<String>,
}

impl SelectStatement {
    /// AND a conditional onto the WHERE clause, or install it if absent
    pub fn push_where(&mut self, conditional: Expr) {
        self.where_clause = Some(WhereClause {
            conditional: match self.where_clause.take() {
                Some(existing) => Expr::and(existing.conditional, conditional),
                None => conditional,
            },
        });
    }
}

/// One `name: a, b` entry of an ALIGN clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignItem {
    /// Address of the aligned (locally derived) concept
    pub address: String,
    /// One source concept per merged select
    pub concepts: Vec<String>,
}

/// `<select> MERGE <select> ... ALIGN ...`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiSelectStatement {
    pub selects: Vec<SelectStatement>,
    pub align: Vec<AlignItem>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    pub local_concepts: Vec<String>,
}

impl MultiSelectStatement {
    /// Aligned concepts first, then every unaligned output of each select
    pub fn output_components(&self) -> Vec<String> {
        let mut out: Vec<String> = self.align.iter().map(|a| a.address.clone()).collect();
        for select in &self.selects {
            for address in &select.selection {
                let aligned = self.align.iter().any(|a| a.concepts.contains(address));
                if !aligned && !out.contains(address) {
                    out.push(address.clone());
                }
            }
        }
        out
    }
}

/// `PERSIST <identifier> INTO <address> FROM <select>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistStatement {
    pub identifier: String,
    pub address: String,
    pub select: SelectStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShowTarget {
    /// Show the SQL a select compiles to
    Select(Box<SelectStatement>),
    Concepts,
    Datasources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowStatement {
    pub target: ShowTarget,
}

/// `VALIDATE ALL;`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidateStatement;

/// `raw_sql('''...''');`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSqlStatement {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOp, Literal};

    #[test]
    fn test_push_where_combines_with_existing() {
        let mut select = SelectStatement {
            selection: vec!["local.x".into()],
            ..Default::default()
        };
        select.push_where(Expr::binary(
            Expr::concept("local.a"),
            BinaryOp::Gt,
            Expr::Literal(Literal::Integer(1)),
        ));
        select.push_where(Expr::concept("local.b"));

        let rendered = select.where_clause.unwrap().conditional.to_string();
        assert_eq!(rendered, "(a > 1) and b");
    }

    #[test]
    fn test_multi_select_output_components() {
        let multi = MultiSelectStatement {
            selects: vec![
                SelectStatement {
                    selection: vec!["a.id".into(), "a.total".into()],
                    ..Default::default()
                },
                SelectStatement {
                    selection: vec!["b.id".into(), "b.count".into()],
                    ..Default::default()
                },
            ],
            align: vec![AlignItem {
                address: "local.id".into(),
                concepts: vec!["a.id".into(), "b.id".into()],
            }],
            ..Default::default()
        };
        assert_eq!(
            multi.output_components(),
            vec!["local.id", "a.total", "b.count"]
        );
    }

    #[test]
    fn test_statement_kinds() {
        let raw = Statement::RawSql(RawSqlStatement {
            text: "select 1".into(),
        });
        assert_eq!(raw.kind(), StatementKind::RawSql);
        assert!(raw.output_components().is_none());

        let show = Statement::Show(ShowStatement {
            target: ShowTarget::Concepts,
        });
        assert_eq!(show.kind(), StatementKind::Introspection);
    }
}
