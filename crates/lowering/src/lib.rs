// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Trilogy Studio - Lowering Layer
//!
//! This crate compiles typed statements into executable SQL for one of the
//! supported dialects.
//!
//! ## Overview
//!
//! The lowering layer is responsible for:
//! - Planning selections: lineage expansion, datasource choice, joins, grouping
//! - Rendering plans as dialect-specific SQL text
//! - Answering introspection statements from the Environment
//!
//! ## Lowering Process
//!
//! ```text
//! Statement → Planner → SelectPlan → SqlRenderer (per dialect) → SQL text
//! ```
//!
//! Compilation happens in two steps, mirroring how callers use it: `compile`
//! turns statements into [`ProcessedStatement`]s (dropping declarations,
//! which produce no output) and `render` turns one of those into text.
//!
//! ## Usage
//!
//! ```rust
//! use trilogy_studio_catalog::SourceFragment;
//! use trilogy_studio_ir::Dialect;
//! use trilogy_studio_lowering::DialectGenerator;
//! use trilogy_studio_semantic::{Environment, parse_text};
//!
//! let mut env = Environment::from_sources(vec![SourceFragment::new(
//!     "facts",
//!     "key x int;\nproperty x.y float;\ndatasource facts (x: x, y: y) grain (x) address db.facts;",
//! )]);
//! let statements = parse_text("import facts;\nselect x, sum(y) as total;", &mut env).unwrap();
//!
//! let generator = DialectGenerator::new(Dialect::DuckDB);
//! let compiled = generator.compile(&env, &statements).unwrap();
//! assert_eq!(compiled.len(), 1);
//!
//! let sql = generator.render(&compiled[0]);
//! assert!(sql.contains("SUM(facts.y) AS total"));
//! assert!(sql.contains("GROUP BY"));
//! ```

pub mod context;
pub mod dialect;
pub mod error;
pub mod introspection;
pub mod planner;
pub mod render;

pub use context::LoweringContext;
pub use dialect::{SqlDialect, for_dialect};
pub use error::{ErrorSeverity, LoweringError, LoweringResult};
pub use introspection::{ProcessedShow, ShowKind};
pub use planner::{Planner, SelectPlan, output_alias};
pub use render::SqlRenderer;

use tracing::debug;
use trilogy_studio_ir::{Dialect, ShowTarget, Statement};
use trilogy_studio_semantic::Environment;

/// A selection ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    /// Output concept addresses, in projection order
    pub output_columns: Vec<String>,
    pub plan: SelectPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPersist {
    pub identifier: String,
    /// Physical table the select is materialized into
    pub address: String,
    pub query: ProcessedQuery,
}

/// A compiled statement
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedStatement {
    Query(ProcessedQuery),
    Persist(ProcessedPersist),
    Show(ProcessedShow),
    RawSql(String),
}

/// Compiles statements for one dialect
#[derive(Debug)]
pub struct DialectGenerator {
    dialect: Dialect,
    sql: Box<dyn SqlDialect>,
}

impl DialectGenerator {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: for_dialect(dialect),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile every statement that produces output
    ///
    /// Imports and declarations are skipped; the result may be shorter than
    /// `statements`.
    pub fn compile(
        &self,
        env: &Environment,
        statements: &[Statement],
    ) -> LoweringResult<Vec<ProcessedStatement>> {
        let mut out = Vec::new();
        for statement in statements {
            if let Some(processed) = self.compile_statement(env, statement)? {
                out.push(processed);
            }
        }
        Ok(out)
    }

    /// Compile one statement; `None` for kinds that produce no output
    pub fn compile_statement(
        &self,
        env: &Environment,
        statement: &Statement,
    ) -> LoweringResult<Option<ProcessedStatement>> {
        let mut planner = Planner::new(env, self.dialect);
        let processed = match statement {
            Statement::Import(_)
            | Statement::Declaration(_)
            | Statement::TypeDeclaration(_)
            | Statement::Datasource(_) => return Ok(None),
            Statement::Select(select) => ProcessedStatement::Query(ProcessedQuery {
                output_columns: select.selection.clone(),
                plan: planner.plan_select(select)?,
            }),
            Statement::MultiSelect(multi) => ProcessedStatement::Query(ProcessedQuery {
                output_columns: multi.output_components(),
                plan: planner.plan_multi(multi)?,
            }),
            Statement::Persist(persist) => ProcessedStatement::Persist(ProcessedPersist {
                identifier: persist.identifier.clone(),
                address: persist.address.clone(),
                query: ProcessedQuery {
                    output_columns: persist.select.selection.clone(),
                    plan: planner.plan_select(&persist.select)?,
                },
            }),
            Statement::Show(show) => ProcessedStatement::Show(match &show.target {
                ShowTarget::Select(select) => {
                    let plan = planner.plan_select(select)?;
                    ProcessedShow::query_text(self.renderer().render_select(&plan))
                }
                ShowTarget::Concepts => introspection::show_concepts(env),
                ShowTarget::Datasources => introspection::show_datasources(env),
            }),
            Statement::Validate(_) => {
                ProcessedStatement::Show(introspection::validate_all(env, self.dialect))
            }
            Statement::RawSql(raw) => ProcessedStatement::RawSql(raw.text.clone()),
        };
        debug!(kind = ?statement.kind(), dialect = %self.dialect, "compiled statement");
        Ok(Some(processed))
    }

    /// SQL text of a compiled statement
    ///
    /// For `SHOW <select>` this is the query text itself; other
    /// introspection results render as tab-separated rows under a header.
    pub fn render(&self, statement: &ProcessedStatement) -> String {
        match statement {
            ProcessedStatement::Query(query) => self.renderer().render_select(&query.plan),
            ProcessedStatement::Persist(persist) => self
                .renderer()
                .render_persist(&persist.address, &persist.query.plan),
            ProcessedStatement::Show(show) => match show.kind {
                ShowKind::QueryText => show.first_value().unwrap_or_default().to_string(),
                _ => std::iter::once(show.columns.join("\t"))
                    .chain(show.rows.iter().map(|row| row.join("\t")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            ProcessedStatement::RawSql(text) => text.clone(),
        }
    }

    fn renderer(&self) -> SqlRenderer<'_> {
        SqlRenderer::new(self.sql.as_ref())
    }
}
