// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL text rendering of [`SelectPlan`]s

use indexmap::IndexMap;
use trilogy_studio_ir::{BinaryOp, DataType, Expr, Literal, SortDirection, UnaryOp};

use crate::dialect::{PersistStyle, SqlDialect};
use crate::planner::{ColumnExpr, ColumnSource, JoinKind, OrderKey, Relation, SelectPlan};

const INDENT: &str = "    ";

/// Renders plans and expressions for one dialect
#[derive(Debug, Clone, Copy)]
pub struct SqlRenderer<'d> {
    dialect: &'d dyn SqlDialect,
}

impl<'d> SqlRenderer<'d> {
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn render_select(&self, plan: &SelectPlan) -> String {
        self.render_plan(plan, None)
    }

    /// Materialize `plan` as a table at `address`
    pub fn render_persist(&self, address: &str, plan: &SelectPlan) -> String {
        let table = self.dialect.quote_table(address);
        match self.dialect.persist_style() {
            PersistStyle::CreateOrReplace => format!(
                "CREATE OR REPLACE TABLE {} AS\n{}",
                table,
                self.render_plan(plan, None)
            ),
            PersistStyle::DropAndCreate => format!(
                "DROP TABLE IF EXISTS {};\nCREATE TABLE {} AS\n{}",
                table,
                table,
                self.render_plan(plan, None)
            ),
            PersistStyle::SelectInto => format!(
                "DROP TABLE IF EXISTS {};\n{}",
                table,
                self.render_plan(plan, Some(&table))
            ),
        }
    }

    fn render_plan(&self, plan: &SelectPlan, into: Option<&str>) -> String {
        let mut lines: Vec<String> = Vec::new();

        if !plan.ctes.is_empty() {
            lines.push("WITH".to_string());
            let count = plan.ctes.len();
            for (i, (name, cte)) in plan.ctes.iter().enumerate() {
                lines.push(format!("{} AS (", self.dialect.quote_identifier(name)));
                lines.push(self.render_plan(cte, None));
                lines.push(if i + 1 < count { ")," } else { ")" }.to_string());
            }
        }

        let top = plan.limit.and_then(|n| self.dialect.top_clause(n));
        lines.push(match top {
            Some(top) => format!("SELECT {}", top),
            None => "SELECT".to_string(),
        });
        let columns: Vec<String> = plan
            .columns
            .iter()
            .map(|column| {
                let expr = match &column.expr {
                    ColumnExpr::Bound(expr) => self.render_expr(expr, &plan.bindings),
                    ColumnExpr::Merged(sources) => self.render_sources(sources),
                };
                format!("{} AS {}", expr, self.dialect.quote_identifier(&column.alias))
            })
            .collect();
        push_list(&mut lines, &columns);

        if let Some(into) = into {
            lines.push(format!("INTO {}", into));
        }

        if let Some(from) = &plan.from {
            lines.push("FROM".to_string());
            lines.push(format!("{}{}", INDENT, self.render_relation(from)));
            for join in &plan.joins {
                let kind = match join.kind {
                    JoinKind::LeftOuter => "LEFT OUTER JOIN",
                    JoinKind::FullOuter => "FULL OUTER JOIN",
                };
                let on: Vec<String> = join
                    .on
                    .iter()
                    .map(|c| {
                        format!(
                            "{} = {}",
                            self.render_sources(&c.left),
                            self.render_source(&c.right)
                        )
                    })
                    .collect();
                lines.push(format!(
                    "{}{} {} ON {}",
                    INDENT,
                    kind,
                    self.render_relation(&join.relation),
                    on.join(" AND ")
                ));
            }
        }

        if let Some(where_clause) = &plan.where_clause {
            lines.push("WHERE".to_string());
            lines.push(format!(
                "{}{}",
                INDENT,
                self.render_expr(where_clause, &plan.bindings)
            ));
        }

        if !plan.group_by.is_empty() {
            lines.push("GROUP BY".to_string());
            let items: Vec<String> = plan
                .group_by
                .iter()
                .map(|e| self.render_expr(e, &plan.bindings))
                .collect();
            push_list(&mut lines, &items);
        }

        if let Some(having) = &plan.having {
            lines.push("HAVING".to_string());
            lines.push(format!("{}{}", INDENT, self.render_expr(having, &plan.bindings)));
        }

        if !plan.order_by.is_empty() {
            lines.push("ORDER BY".to_string());
            let items: Vec<String> = plan
                .order_by
                .iter()
                .map(|(key, direction)| {
                    let key = match key {
                        OrderKey::Output(alias) => self.dialect.quote_identifier(alias),
                        OrderKey::Expr(expr) => self.render_expr(expr, &plan.bindings),
                    };
                    match direction {
                        SortDirection::Asc => format!("{} ASC", key),
                        SortDirection::Desc => format!("{} DESC", key),
                    }
                })
                .collect();
            push_list(&mut lines, &items);
        }

        if let Some(limit) = plan.limit.and_then(|n| self.dialect.limit_clause(n)) {
            lines.push(limit);
        }

        lines.join("\n")
    }

    fn render_relation(&self, relation: &Relation) -> String {
        match relation {
            Relation::Table { address, alias } => format!(
                "{} AS {}",
                self.dialect.quote_table(address),
                self.dialect.quote_identifier(alias)
            ),
            Relation::Cte { name } => self.dialect.quote_identifier(name),
        }
    }

    fn render_source(&self, source: &ColumnSource) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_identifier(&source.relation),
            self.dialect.quote_identifier(&source.column)
        )
    }

    fn render_sources(&self, sources: &[ColumnSource]) -> String {
        match sources {
            [single] => self.render_source(single),
            many => {
                let args: Vec<String> = many.iter().map(|s| self.render_source(s)).collect();
                self.dialect.function("coalesce", &args)
            }
        }
    }

    /// Render an expression whose concept references are keys of `bindings`
    pub fn render_expr(&self, expr: &Expr, bindings: &IndexMap<String, ColumnSource>) -> String {
        match expr {
            Expr::Concept(c) => match bindings.get(&c.address) {
                Some(source) => self.render_source(source),
                None => self.dialect.quote_table(&c.address),
            },
            Expr::Literal(literal) => self.render_literal(literal),
            Expr::BinaryOp { left, op, right } => {
                let l = self.render_operand(left, *op, false, bindings);
                let r = self.render_operand(right, *op, true, bindings);
                match op {
                    BinaryOp::Mod => self.dialect.modulo(&l, &r),
                    other => format!("{} {} {}", l, sql_operator(*other), r),
                }
            }
            Expr::UnaryOp { op, expr } => {
                let inner = self.render_nested(expr, bindings);
                match op {
                    UnaryOp::Neg => format!("-{}", inner),
                    UnaryOp::Not => format!("NOT {}", inner),
                }
            }
            Expr::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| self.render_expr(a, bindings)).collect();
                self.dialect.function(name, &args)
            }
            Expr::Case {
                conditions,
                results,
                else_result,
            } => {
                let mut out = String::from("CASE");
                for (condition, result) in conditions.iter().zip(results) {
                    out.push_str(&format!(
                        " WHEN {} THEN {}",
                        self.render_expr(condition, bindings),
                        self.render_expr(result, bindings)
                    ));
                }
                if let Some(e) = else_result {
                    out.push_str(&format!(" ELSE {}", self.render_expr(e, bindings)));
                }
                out.push_str(" END");
                out
            }
            Expr::Cast { expr, type_name } => {
                let target = type_name
                    .parse::<DataType>()
                    .map(|ty| self.dialect.type_name(&ty))
                    .unwrap_or_else(|_| type_name.to_ascii_uppercase());
                format!("CAST({} AS {})", self.render_expr(expr, bindings), target)
            }
            Expr::Paren(inner) => format!("({})", self.render_expr(inner, bindings)),
            Expr::IsNull { expr, negated } => format!(
                "{} IS {}NULL",
                self.render_nested(expr, bindings),
                if *negated { "NOT " } else { "" }
            ),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let items: Vec<String> = list.iter().map(|e| self.render_expr(e, bindings)).collect();
                format!(
                    "{} {}IN ({})",
                    self.render_nested(expr, bindings),
                    if *negated { "NOT " } else { "" },
                    items.join(", ")
                )
            }
        }
    }

    fn render_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Null => "NULL".to_string(),
            Literal::Boolean(b) => self.dialect.bool_literal(*b),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(x) => format!("{:?}", x),
            Literal::String(s) => self.dialect.string_literal(s),
        }
    }

    /// Operand of a binary operator, parenthesized when it binds looser
    fn render_operand(
        &self,
        operand: &Expr,
        parent: BinaryOp,
        right: bool,
        bindings: &IndexMap<String, ColumnSource>,
    ) -> String {
        let rendered = self.render_expr(operand, bindings);
        match operand {
            Expr::BinaryOp { op, .. }
                if op.precedence() < parent.precedence()
                    || (right && op.precedence() == parent.precedence()) =>
            {
                format!("({})", rendered)
            }
            _ => rendered,
        }
    }

    /// Operand of a unary or postfix form
    fn render_nested(&self, expr: &Expr, bindings: &IndexMap<String, ColumnSource>) -> String {
        let rendered = self.render_expr(expr, bindings);
        if matches!(expr, Expr::BinaryOp { .. }) {
            format!("({})", rendered)
        } else {
            rendered
        }
    }
}

fn sql_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::NotEq => "<>",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
        BinaryOp::Like => "LIKE",
        BinaryOp::NotLike => "NOT LIKE",
        other => other.symbol(),
    }
}

fn push_list(lines: &mut Vec<String>, items: &[String]) {
    let count = items.len();
    for (i, item) in items.iter().enumerate() {
        let comma = if i + 1 < count { "," } else { "" };
        lines.push(format!("{}{}{}", INDENT, item, comma));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{BigQueryDialect, DuckDbDialect, SqlServerDialect};

    fn bindings() -> IndexMap<String, ColumnSource> {
        let mut b = IndexMap::new();
        b.insert("local.a".to_string(), ColumnSource::new("t", "a"));
        b.insert("local.b".to_string(), ColumnSource::new("t", "order"));
        b
    }

    #[test]
    fn test_render_precedence() {
        let renderer = SqlRenderer::new(&DuckDbDialect);
        let sum = Expr::binary(Expr::concept("local.a"), BinaryOp::Add, Expr::concept("local.b"));
        let product = Expr::binary(sum, BinaryOp::Mul, Expr::Literal(Literal::Integer(2)));
        assert_eq!(renderer.render_expr(&product, &bindings()), "(t.a + t.\"order\") * 2");
    }

    #[test]
    fn test_render_operators() {
        let renderer = SqlRenderer::new(&DuckDbDialect);
        let expr = Expr::binary(
            Expr::binary(
                Expr::concept("local.a"),
                BinaryOp::NotEq,
                Expr::Literal(Literal::String("x".into())),
            ),
            BinaryOp::And,
            Expr::IsNull {
                expr: Box::new(Expr::concept("local.b")),
                negated: true,
            },
        );
        assert_eq!(
            renderer.render_expr(&expr, &bindings()),
            "t.a <> 'x' AND t.\"order\" IS NOT NULL"
        );
    }

    #[test]
    fn test_dialect_literals() {
        let lit = Expr::Literal(Literal::Boolean(true));
        assert_eq!(SqlRenderer::new(&SqlServerDialect).render_expr(&lit, &bindings()), "1");
        assert_eq!(SqlRenderer::new(&DuckDbDialect).render_expr(&lit, &bindings()), "TRUE");

        let modulo = Expr::binary(
            Expr::concept("local.a"),
            BinaryOp::Mod,
            Expr::Literal(Literal::Integer(2)),
        );
        assert_eq!(
            SqlRenderer::new(&BigQueryDialect).render_expr(&modulo, &bindings()),
            "MOD(t.a, 2)"
        );
    }

    #[test]
    fn test_render_cast() {
        let cast = Expr::Cast {
            expr: Box::new(Expr::concept("local.a")),
            type_name: "string".to_string(),
        };
        assert_eq!(
            SqlRenderer::new(&BigQueryDialect).render_expr(&cast, &bindings()),
            "CAST(t.a AS STRING)"
        );
    }
}
