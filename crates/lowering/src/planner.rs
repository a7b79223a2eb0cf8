// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query planning
//!
//! Turns a typed selection into a [`SelectPlan`]: which tables to read, how
//! to join them, and which SQL expression produces each output.
//!
//! ## Steps
//!
//! 1. Expand every referenced concept's lineage down to root concepts,
//!    inlining constants and derived concepts
//! 2. Cover the roots with as few datasources as possible (greedy, most
//!    roots first), joining each additional datasource on a shared key
//! 3. Group by every non-aggregate output when anything aggregates
//! 4. Route aggregate conjuncts of WHERE into HAVING
//!
//! Multi-selects plan each inner select as a CTE and full-outer-join the
//! CTEs on their aligned concepts.

use indexmap::IndexMap;
use tracing::debug;
use trilogy_studio_ir::{
    Datasource, Dialect, Expr, MultiSelectStatement, Purpose, SelectStatement, SortDirection,
};
use trilogy_studio_semantic::{Environment, contains_aggregate};

use crate::context::LoweringContext;
use crate::error::{LoweringError, LoweringResult};

/// A column of a table or CTE
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSource {
    pub relation: String,
    pub column: String,
}

impl ColumnSource {
    pub fn new(relation: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            column: column.into(),
        }
    }
}

/// Something a query reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Table { address: String, alias: String },
    Cte { name: String },
}

impl Relation {
    /// Name other clauses use to refer to this relation
    pub fn name(&self) -> &str {
        match self {
            Relation::Table { alias, .. } => alias,
            Relation::Cte { name } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    LeftOuter,
    FullOuter,
}

/// `left = right`; a left side with several sources is coalesced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub left: Vec<ColumnSource>,
    pub right: ColumnSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub relation: Relation,
    pub on: Vec<JoinCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnExpr {
    /// An expression over root concepts, rendered through the plan's bindings
    Bound(Expr),
    /// One column, or the coalesce of several
    Merged(Vec<ColumnSource>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub expr: ColumnExpr,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    /// Order by an output column's alias
    Output(String),
    Expr(Expr),
}

/// A dialect-independent SELECT
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectPlan {
    pub ctes: Vec<(String, SelectPlan)>,
    pub columns: Vec<OutputColumn>,
    pub from: Option<Relation>,
    pub joins: Vec<Join>,
    /// Root concept address to the column that provides it
    pub bindings: IndexMap<String, ColumnSource>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<(OrderKey, SortDirection)>,
    pub limit: Option<u64>,
}

/// SQL-safe output name for a concept: bare name in the default namespace,
/// otherwise the address with dots replaced
pub fn output_alias(env: &Environment, address: &str) -> String {
    env.concept(address)
        .map(|c| c.display_name())
        .unwrap_or_else(|| address.to_string())
        .replace('.', "_")
}

/// Plans selections against one Environment
#[derive(Debug)]
pub struct Planner<'env> {
    env: &'env Environment,
    ctx: LoweringContext,
}

impl<'env> Planner<'env> {
    pub fn new(env: &'env Environment, dialect: Dialect) -> Self {
        Self {
            env,
            ctx: LoweringContext::new(dialect),
        }
    }

    /// Expand a concept to an expression over root concepts
    pub fn expand_concept(&mut self, address: &str) -> LoweringResult<Expr> {
        let env = self.env;
        let concept = env
            .concept(address)
            .ok_or_else(|| LoweringError::UnresolvableConcept {
                address: address.to_string(),
            })?;
        let Some(lineage) = &concept.lineage else {
            return Ok(Expr::concept(address));
        };

        self.ctx.enter_recursive_context(address)?;
        let expanded = self.expand(lineage);
        self.ctx.exit_recursive_context();
        Ok(expanded?.parenthesized())
    }

    /// Expand every concept reference in `expr`
    pub fn expand(&mut self, expr: &Expr) -> LoweringResult<Expr> {
        Ok(match expr {
            Expr::Concept(c) => self.expand_concept(&c.address)?,
            Expr::Literal(_) => expr.clone(),
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: Box::new(self.expand(left)?),
                op: *op,
                right: Box::new(self.expand(right)?),
            },
            Expr::UnaryOp { op, expr } => Expr::UnaryOp {
                op: *op,
                expr: Box::new(self.expand(expr)?),
            },
            Expr::Function { name, args } => Expr::Function {
                name: name.clone(),
                args: self.expand_all(args)?,
            },
            Expr::Case {
                conditions,
                results,
                else_result,
            } => Expr::Case {
                conditions: self.expand_all(conditions)?,
                results: self.expand_all(results)?,
                else_result: match else_result {
                    Some(e) => Some(Box::new(self.expand(e)?)),
                    None => None,
                },
            },
            Expr::Cast { expr, type_name } => Expr::Cast {
                expr: Box::new(self.expand(expr)?),
                type_name: type_name.clone(),
            },
            Expr::Paren(inner) => Expr::Paren(Box::new(self.expand(inner)?)),
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(self.expand(expr)?),
                negated: *negated,
            },
            Expr::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: Box::new(self.expand(expr)?),
                list: self.expand_all(list)?,
                negated: *negated,
            },
        })
    }

    fn expand_all(&mut self, exprs: &[Expr]) -> LoweringResult<Vec<Expr>> {
        exprs.iter().map(|e| self.expand(e)).collect()
    }

    pub fn plan_select(&mut self, select: &SelectStatement) -> LoweringResult<SelectPlan> {
        let mut outputs = Vec::with_capacity(select.selection.len());
        for address in &select.selection {
            outputs.push((self.expand_concept(address)?, output_alias(self.env, address)));
        }

        let mut where_parts = Vec::new();
        let mut having_parts = Vec::new();
        if let Some(clause) = &select.where_clause {
            let expanded = self.expand(&clause.conditional)?;
            for conjunct in expanded.conjuncts() {
                if contains_aggregate(conjunct) {
                    having_parts.push(conjunct.clone());
                } else {
                    where_parts.push(conjunct.clone());
                }
            }
        }
        if let Some(clause) = &select.having_clause {
            having_parts.push(self.expand(&clause.conditional)?);
        }

        let mut order_by = Vec::with_capacity(select.order_by.len());
        for item in &select.order_by {
            let key = match &item.expr {
                Expr::Concept(c) if select.selection.contains(&c.address) => {
                    OrderKey::Output(output_alias(self.env, &c.address))
                }
                other => OrderKey::Expr(self.expand(other)?),
            };
            order_by.push((key, item.direction));
        }

        let mut roots: Vec<String> = Vec::new();
        let mut collect = |expr: &Expr| {
            for address in expr.concept_addresses() {
                if !roots.contains(&address) {
                    roots.push(address);
                }
            }
        };
        outputs.iter().for_each(|(e, _)| collect(e));
        where_parts.iter().for_each(&mut collect);
        having_parts.iter().for_each(&mut collect);
        for (key, _) in &order_by {
            if let OrderKey::Expr(e) = key {
                collect(e);
            }
        }

        let aggregated =
            !having_parts.is_empty() || outputs.iter().any(|(e, _)| contains_aggregate(e));
        let group_by = if aggregated {
            outputs
                .iter()
                .filter(|(e, _)| !contains_aggregate(e) && !e.concept_addresses().is_empty())
                .map(|(e, _)| e.clone())
                .collect()
        } else {
            Vec::new()
        };

        let (from, joins, bindings) = self.cover(&roots)?;
        debug!(
            roots = roots.len(),
            joins = joins.len(),
            aggregated,
            "planned select"
        );

        Ok(SelectPlan {
            ctes: Vec::new(),
            columns: outputs
                .into_iter()
                .map(|(expr, alias)| OutputColumn {
                    expr: ColumnExpr::Bound(expr),
                    alias,
                })
                .collect(),
            from,
            joins,
            bindings,
            where_clause: conjoin(where_parts),
            group_by,
            having: conjoin(having_parts),
            order_by,
            limit: select.limit,
        })
    }

    /// Choose datasources for `roots` and bind each root to a column
    #[allow(clippy::type_complexity)]
    fn cover(
        &self,
        roots: &[String],
    ) -> LoweringResult<(Option<Relation>, Vec<Join>, IndexMap<String, ColumnSource>)> {
        let env = self.env;
        let unbound: Vec<String> = roots
            .iter()
            .filter(|r| !env.datasources().values().any(|ds| ds.binds(r)))
            .cloned()
            .collect();
        if !unbound.is_empty() {
            return Err(LoweringError::NoDatasource { concepts: unbound });
        }

        let mut remaining: Vec<&str> = roots.iter().map(String::as_str).collect();
        let mut chosen: Vec<&Datasource> = Vec::new();
        let mut joins = Vec::new();

        while !remaining.is_empty() {
            let mut best: Option<(&Datasource, usize, Vec<JoinCondition>)> = None;
            for ds in env.datasources().values() {
                if chosen.iter().any(|c| c.name == ds.name) {
                    continue;
                }
                let covered = remaining.iter().filter(|r| ds.binds(r)).count();
                if covered == 0 || best.as_ref().is_some_and(|(_, n, _)| *n >= covered) {
                    continue;
                }
                let on = self.join_conditions(&chosen, ds);
                if !chosen.is_empty() && on.is_empty() {
                    continue;
                }
                best = Some((ds, covered, on));
            }

            let Some((ds, _, on)) = best else {
                return Err(LoweringError::NoJoinPath {
                    concepts: remaining.iter().map(|r| r.to_string()).collect(),
                });
            };
            remaining.retain(|r| !ds.binds(r));
            if !chosen.is_empty() {
                joins.push(Join {
                    kind: JoinKind::LeftOuter,
                    relation: table_relation(ds),
                    on,
                });
            }
            chosen.push(ds);
        }

        let mut bindings = IndexMap::new();
        for root in roots {
            let source = chosen
                .iter()
                .find_map(|ds| ds.column_for(root).map(|col| ColumnSource::new(ds.alias(), col)));
            if let Some(source) = source {
                bindings.insert(root.clone(), source);
            }
        }

        Ok((chosen.first().map(|ds| table_relation(ds)), joins, bindings))
    }

    /// Equalities on key concepts `ds` shares with already chosen datasources
    fn join_conditions(&self, chosen: &[&Datasource], ds: &Datasource) -> Vec<JoinCondition> {
        let mut on = Vec::new();
        for binding in &ds.columns {
            let is_key = self
                .env
                .concept(&binding.concept)
                .is_some_and(|c| c.purpose == Purpose::Key);
            if !is_key {
                continue;
            }
            let existing = chosen.iter().find_map(|prev| {
                prev.column_for(&binding.concept)
                    .map(|col| ColumnSource::new(prev.alias(), col))
            });
            if let Some(left) = existing {
                on.push(JoinCondition {
                    left: vec![left],
                    right: ColumnSource::new(ds.alias(), &binding.column),
                });
            }
        }
        on
    }

    pub fn plan_multi(&mut self, multi: &MultiSelectStatement) -> LoweringResult<SelectPlan> {
        if multi.selects.len() < 2 {
            return Err(LoweringError::InvalidMultiSelect {
                message: "at least two selects are required".to_string(),
            });
        }

        let mut ctes = Vec::with_capacity(multi.selects.len());
        for (i, select) in multi.selects.iter().enumerate() {
            let mut plan = self.plan_select(select)?;
            if plan.limit.is_none() {
                plan.order_by.clear();
            }
            ctes.push((format!("cte_{}", i), plan));
        }

        // Source column of every aligned concept, per CTE
        let mut aligned: Vec<Vec<(usize, ColumnSource)>> = Vec::with_capacity(multi.align.len());
        for item in &multi.align {
            let mut sources = Vec::new();
            for (position, concept) in item.concepts.iter().enumerate() {
                let owner = if multi
                    .selects
                    .get(position)
                    .is_some_and(|s| s.selection.contains(concept))
                {
                    Some(position)
                } else {
                    multi.selects.iter().position(|s| s.selection.contains(concept))
                };
                let Some(index) = owner else {
                    return Err(LoweringError::InvalidMultiSelect {
                        message: format!("aligned concept '{}' is not selected", concept),
                    });
                };
                sources.push((
                    index,
                    ColumnSource::new(&ctes[index].0, output_alias(self.env, concept)),
                ));
            }
            aligned.push(sources);
        }

        let mut columns = Vec::new();
        for (item, sources) in multi.align.iter().zip(&aligned) {
            columns.push(OutputColumn {
                expr: ColumnExpr::Merged(sources.iter().map(|(_, s)| s.clone()).collect()),
                alias: output_alias(self.env, &item.address),
            });
        }
        let components = multi.output_components();
        for address in components.iter().skip(multi.align.len()) {
            let Some(index) = multi
                .selects
                .iter()
                .position(|s| s.selection.contains(address))
            else {
                continue;
            };
            let alias = output_alias(self.env, address);
            columns.push(OutputColumn {
                expr: ColumnExpr::Merged(vec![ColumnSource::new(&ctes[index].0, &alias)]),
                alias,
            });
        }

        let mut joins = Vec::new();
        for (i, (name, _)) in ctes.iter().enumerate().skip(1) {
            let mut on = Vec::new();
            for sources in &aligned {
                let left: Vec<ColumnSource> = sources
                    .iter()
                    .filter(|(index, _)| *index < i)
                    .map(|(_, s)| s.clone())
                    .collect();
                let right = sources.iter().find(|(index, _)| *index == i);
                if let (false, Some((_, right))) = (left.is_empty(), right) {
                    on.push(JoinCondition {
                        left,
                        right: right.clone(),
                    });
                }
            }
            if on.is_empty() {
                return Err(LoweringError::InvalidMultiSelect {
                    message: format!("select {} shares no aligned concept with the others", i + 1),
                });
            }
            joins.push(Join {
                kind: JoinKind::FullOuter,
                relation: Relation::Cte { name: name.clone() },
                on,
            });
        }

        let mut order_by = Vec::with_capacity(multi.order_by.len());
        for item in &multi.order_by {
            let address = match &item.expr {
                Expr::Concept(c) => Some(c.address.as_str()),
                _ => None,
            };
            let target = address.and_then(|address| {
                if components.iter().any(|c| c == address) {
                    return Some(address.to_string());
                }
                multi
                    .align
                    .iter()
                    .find(|a| a.concepts.iter().any(|c| c == address))
                    .map(|a| a.address.clone())
            });
            let Some(target) = target else {
                return Err(LoweringError::UnsupportedSyntax {
                    dialect: self.ctx.dialect().to_string(),
                    feature: format!("ORDER BY {} on a merged query", item.expr),
                    suggestion: "Order by a selected or aligned concept".to_string(),
                });
            };
            order_by.push((OrderKey::Output(output_alias(self.env, &target)), item.direction));
        }

        Ok(SelectPlan {
            from: ctes.first().map(|(name, _)| Relation::Cte { name: name.clone() }),
            ctes,
            columns,
            joins,
            order_by,
            limit: multi.limit,
            ..Default::default()
        })
    }
}

fn table_relation(ds: &Datasource) -> Relation {
    Relation::Table {
        address: ds.address.clone(),
        alias: ds.alias(),
    }
}

fn conjoin(parts: Vec<Expr>) -> Option<Expr> {
    parts.into_iter().reduce(Expr::and)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilogy_studio_ir::{Concept, DataType};

    fn facts_env() -> Environment {
        let mut env = Environment::default();
        env.declare_concept(Concept::new("x", "local", DataType::Integer, Purpose::Key));
        env.declare_concept(
            Concept::new("y", "local", DataType::Float, Purpose::Property)
                .with_keys(vec!["local.x".to_string()]),
        );
        env.add_datasource(
            Datasource::new("facts", "db.facts")
                .with_column("x", "local.x")
                .with_column("y", "local.y")
                .with_grain(vec!["local.x".to_string()]),
        );
        env
    }

    #[test]
    fn test_expand_inlines_lineage() {
        let mut env = facts_env();
        env.declare_concept(
            Concept::new("total", "local", DataType::Float, Purpose::Metric).with_lineage(
                Expr::Function {
                    name: "sum".into(),
                    args: vec![Expr::concept("local.y")],
                },
            ),
        );
        let mut planner = Planner::new(&env, Dialect::DuckDB);
        let expanded = planner.expand_concept("local.total").unwrap();
        assert_eq!(expanded.to_string(), "sum(y)");
    }

    #[test]
    fn test_cyclic_lineage_hits_recursion_limit() {
        let mut env = facts_env();
        env.declare_concept(
            Concept::new("a", "local", DataType::Integer, Purpose::Property)
                .with_lineage(Expr::concept("local.b")),
        );
        env.declare_concept(
            Concept::new("b", "local", DataType::Integer, Purpose::Property)
                .with_lineage(Expr::concept("local.a")),
        );
        let mut planner = Planner::new(&env, Dialect::DuckDB);
        let err = planner.expand_concept("local.a").unwrap_err();
        assert!(matches!(err, LoweringError::RecursionLimitExceeded { .. }));
    }

    #[test]
    fn test_unbound_root() {
        let mut env = facts_env();
        env.declare_concept(Concept::new("z", "local", DataType::Integer, Purpose::Key));
        let select = SelectStatement {
            selection: vec!["local.z".to_string()],
            ..Default::default()
        };
        let err = Planner::new(&env, Dialect::DuckDB)
            .plan_select(&select)
            .unwrap_err();
        assert_eq!(
            err,
            LoweringError::NoDatasource {
                concepts: vec!["local.z".to_string()]
            }
        );
    }

    #[test]
    fn test_plan_binds_roots() {
        let env = facts_env();
        let select = SelectStatement {
            selection: vec!["local.x".to_string(), "local.y".to_string()],
            limit: Some(3),
            ..Default::default()
        };
        let plan = Planner::new(&env, Dialect::DuckDB).plan_select(&select).unwrap();
        assert_eq!(plan.bindings["local.y"], ColumnSource::new("facts", "y"));
        assert!(plan.joins.is_empty());
        assert!(plan.group_by.is_empty());
        assert_eq!(plan.limit, Some(3));
    }

    #[test]
    fn test_output_alias() {
        let env = facts_env();
        assert_eq!(output_alias(&env, "local.y"), "y");
        assert_eq!(output_alias(&env, "s.store.revenue"), "s_store_revenue");
    }
}
