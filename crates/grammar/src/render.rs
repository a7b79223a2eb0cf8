// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Canonical text rendering of syntax trees.
//!
//! Declarations are lowercase, clause keywords uppercase, and select items
//! are listed one per line with four-space indentation.

use std::fmt::{self, Display, Formatter, Write};

use trilogy_studio_ir::UnaryOp;

use crate::syntax::*;

const INDENT: &str = "    ";

impl ParseTree {
    /// Render every statement, separated by blank lines
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Display for SyntaxStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.kind)?;
        if let Some(comment) = &self.comment {
            write!(f, " # {}", comment)?;
        }
        Ok(())
    }
}

impl Display for StatementSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StatementSyntax::Import { path, alias } => {
                write!(f, "import {}", path)?;
                if let Some(alias) = alias {
                    write!(f, " as {}", alias)?;
                }
                Ok(())
            }
            StatementSyntax::TypeDeclaration { name, base } => write!(f, "type {} {}", name, base),
            StatementSyntax::Concept(concept) => write!(f, "{}", concept),
            StatementSyntax::Datasource(datasource) => write!(f, "{}", datasource),
            StatementSyntax::Select(select) => write!(f, "{}", select),
            StatementSyntax::MultiSelect(multi) => write!(f, "{}", multi),
            StatementSyntax::Persist {
                name,
                address,
                select,
            } => write!(
                f,
                "PERSIST {} INTO {} FROM\n{}",
                name,
                render_address(address),
                select
            ),
            StatementSyntax::Show(ShowSyntax::Select(select)) => write!(f, "SHOW\n{}", select),
            StatementSyntax::Show(ShowSyntax::Concepts) => write!(f, "SHOW CONCEPTS"),
            StatementSyntax::Show(ShowSyntax::Datasources) => write!(f, "SHOW DATASOURCES"),
            StatementSyntax::Validate => write!(f, "VALIDATE ALL"),
            StatementSyntax::RawSql(text) => write!(f, "raw_sql('''{}''')", text),
        }
    }
}

impl Display for TypeSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for t in &self.traits {
            write!(f, "::{}", t)?;
        }
        Ok(())
    }
}

impl Display for ConceptSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.keyword.as_str())?;
        match self.keys.as_slice() {
            [] => {}
            [key] => write!(f, "{}.", key)?,
            keys => write!(f, "<{}>.", keys.join(", "))?,
        }
        write!(f, "{}", self.name)?;
        if let Some(datatype) = &self.datatype {
            write!(f, " {}", datatype)?;
        }
        if let Some(lineage) = &self.lineage {
            write!(f, " <- {}", lineage)?;
        }
        Ok(())
    }
}

impl Display for DatasourceSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "datasource {} (", self.name)?;
        for column in &self.columns {
            writeln!(f, "{}{}: {},", INDENT, column.column, column.concept)?;
        }
        writeln!(f, ")")?;
        if !self.grain.is_empty() {
            writeln!(f, "grain ({})", self.grain.join(", "))?;
        }
        write!(f, "address {}", render_address(&self.address))
    }
}

impl Display for SelectSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(where_clause) = &self.where_clause {
            writeln!(f, "WHERE\n{}{}", INDENT, where_clause)?;
        }
        write!(f, "SELECT")?;
        for item in &self.items {
            write!(f, "\n{}{}", INDENT, item.expr)?;
            if let Some(alias) = &item.alias {
                write!(f, " as {}", alias)?;
            }
            write!(f, ",")?;
        }
        if let Some(having) = &self.having {
            write!(f, "\nHAVING\n{}{}", INDENT, having)?;
        }
        write_order_and_limit(f, &self.order_by, self.limit)
    }
}

impl Display for MultiSelectSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, select) in self.selects.iter().enumerate() {
            if idx > 0 {
                write!(f, "\nMERGE\n")?;
            }
            write!(f, "{}", select)?;
        }
        write!(f, "\nALIGN")?;
        for item in &self.align {
            write!(f, "\n{}{}: {},", INDENT, item.name, item.concepts.join(", "))?;
        }
        write_order_and_limit(f, &self.order_by, self.limit)
    }
}

fn write_order_and_limit(
    f: &mut Formatter<'_>,
    order_by: &[OrderSyntax],
    limit: Option<u64>,
) -> fmt::Result {
    if !order_by.is_empty() {
        write!(f, "\nORDER BY")?;
        let last = order_by.len() - 1;
        for (idx, item) in order_by.iter().enumerate() {
            let direction = if item.descending { "desc" } else { "asc" };
            let sep = if idx < last { "," } else { "" };
            write!(f, "\n{}{} {}{}", INDENT, item.expr, direction, sep)?;
        }
    }
    if let Some(limit) = limit {
        write!(f, "\nLIMIT {}", limit)?;
    }
    Ok(())
}

fn render_address(address: &str) -> String {
    let plain = !address.is_empty()
        && address.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        });
    if plain {
        address.to_string()
    } else {
        format!("`{}`", address)
    }
}

impl Display for LiteralSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralSyntax::Null => write!(f, "null"),
            LiteralSyntax::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            LiteralSyntax::Integer(i) => write!(f, "{}", i),
            LiteralSyntax::Float(x) => write!(f, "{:?}", x),
            LiteralSyntax::String(s) => {
                f.write_char('\'')?;
                for ch in s.chars() {
                    match ch {
                        '\'' | '\\' => write!(f, "\\{}", ch)?,
                        '\n' => f.write_str("\\n")?,
                        other => f.write_char(other)?,
                    }
                }
                f.write_char('\'')
            }
        }
    }
}

impl Display for ExprSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Ref(path) => write!(f, "{}", path),
            ExprKind::Literal(literal) => write!(f, "{}", literal),
            ExprKind::Binary { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            ExprKind::Unary { op, expr } => match op {
                UnaryOp::Neg => write!(f, "-{}", expr),
                UnaryOp::Not => write!(f, "not {}", expr),
            },
            ExprKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Paren(inner) => write!(f, "({})", inner),
            ExprKind::IsNull { expr, negated } => {
                write!(f, "{} is {}null", expr, if *negated { "not " } else { "" })
            }
            ExprKind::InList {
                expr,
                list,
                negated,
            } => {
                write!(f, "{} {}in (", expr, if *negated { "not " } else { "" })?;
                write_list(f, list)?;
                write!(f, ")")
            }
            ExprKind::Case { whens, else_result } => {
                write!(f, "CASE")?;
                for (condition, result) in whens {
                    write!(f, " WHEN {} THEN {}", condition, result)?;
                }
                if let Some(else_result) = else_result {
                    write!(f, " ELSE {}", else_result)?;
                }
                write!(f, " END")
            }
            ExprKind::Cast { expr, datatype } => write!(f, "cast({} as {})", expr, datatype),
        }
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[ExprSyntax]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
