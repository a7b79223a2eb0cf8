// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Batch Query Compiler
//!
//! Compiles independent fragments against one shared Environment.
//!
//! ## Per-request setup
//!
//! 1. Build the Environment from the request's sources
//! 2. Apply the request's imports as one synthesized parse
//! 3. Compile the request-wide filters once into a conditional
//!
//! ## Per-fragment pipeline
//!
//! ```text
//! Parsed → Dispatched ─┬─ RawSql ────────────────────────────────┐
//!                      ├─ Introspection ─────────────────────────┤
//!                      ├─ Selection → Projected → Limited →      │
//!                      │             Filtered → Compiled ────────┤
//!                      └─ Other (no output) ─────────────────────┴→ CleanedUp
//! ```
//!
//! Each fragment runs inside an [`EnvironmentTransaction`]. On success the
//! transaction commits, removing the fragment's locally derived concepts
//! when cleanup is enabled. Top-level declarations such as `const` or `key`
//! extend the shared model and stay visible to later fragments. Filter
//! conditionals carry their parameter values inline and add nothing to the
//! Environment. On failure the error is recorded for that slot
//! and the Environment is rolled back or rebuilt, per
//! [`FailureRecovery`]. Results always match the input in order and length.
//!
//! [`EnvironmentTransaction`]: trilogy_studio_semantic::EnvironmentTransaction

use std::time::Instant;

use tracing::{debug, error};
use trilogy_studio_ir::{Expr, SelectStatement, Statement};
use trilogy_studio_lowering::{DialectGenerator, ProcessedStatement, ShowKind};
use trilogy_studio_semantic::{Environment, SemanticError, parse_text};

use crate::config::{EngineConfig, FailureRecovery};
use crate::error::{EngineError, EngineResult};
use crate::filters::{BATCH_PROBE, filters_to_conditional, fragment_probe};
use crate::models::{BatchRequest, CompiledResult, OutputColumn, QueryFragment, ShowResults};
use crate::profiling::StageTimings;
use crate::synthesis::{import_text, synthesize_and_parse};

/// Compile every fragment of `request`
///
/// # Errors
///
/// Only setup failures: building the Environment, applying imports, or
/// compiling the request-wide filters. Fragment failures are reported in
/// their [`CompiledResult`].
pub fn compile_batch(request: &BatchRequest, config: &EngineConfig) -> EngineResult<Vec<CompiledResult>> {
    BatchCompiler::new(request, config).run()
}

/// Trim and terminate fragment text; `None` if there is nothing to parse
pub fn normalize_fragment(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else if text.ends_with(';') {
        Some(text.to_string())
    } else {
        Some(format!("{};", text))
    }
}

/// What one fragment compiled to
#[derive(Debug)]
pub(crate) enum FragmentOutput {
    Empty,
    RawSql(String),
    Show(ShowResults, Option<String>),
    Query {
        sql: Option<String>,
        columns: Vec<OutputColumn>,
    },
}

impl FragmentOutput {
    pub(crate) fn into_result(self, label: &str) -> CompiledResult {
        let mut result = CompiledResult::empty(label);
        match self {
            FragmentOutput::Empty => {}
            FragmentOutput::RawSql(text) => result.sql = Some(text),
            FragmentOutput::Show(results, sql) => {
                result.sql = sql;
                result.results = Some(results);
            }
            FragmentOutput::Query { sql, columns } => {
                result.sql = sql;
                result.output_columns = columns;
            }
        }
        result
    }
}

/// The request-scoped state every fragment compiles against
pub(crate) struct Session {
    env: Environment,
    global_filter: Option<Expr>,
}

pub struct BatchCompiler<'a> {
    request: &'a BatchRequest,
    config: &'a EngineConfig,
    generator: DialectGenerator,
}

impl<'a> BatchCompiler<'a> {
    pub fn new(request: &'a BatchRequest, config: &'a EngineConfig) -> Self {
        let dialect = request.dialect.unwrap_or(config.default_dialect);
        Self {
            request,
            config,
            generator: DialectGenerator::new(dialect),
        }
    }

    pub fn run(&self) -> EngineResult<Vec<CompiledResult>> {
        let mut timings = StageTimings::new("batch", self.config.performance_logging);
        let mut session = self.setup(&mut timings)?;

        let mut results = Vec::with_capacity(self.request.queries.len());
        for (index, fragment) in self.request.queries.iter().enumerate() {
            let start = Instant::now();
            let outcome = self.compile_in_transaction(&mut session, index, fragment);
            timings.record("queries", start.elapsed());

            match outcome {
                Ok(output) => results.push(output.into_result(&fragment.label)),
                Err(e) => {
                    error!(
                        label = %fragment.label,
                        index,
                        error = %e,
                        detail = ?e,
                        "fragment failed to compile"
                    );
                    results.push(CompiledResult::failed(&fragment.label, e.to_string()));
                    if self.config.failure_recovery == FailureRecovery::Rebuild {
                        debug!(index, "rebuilding environment after failure");
                        session = self.setup(&mut timings)?;
                    }
                }
            }
        }

        debug!(
            queries = results.len(),
            failed = results.iter().filter(|r| !r.is_ok()).count(),
            dialect = %self.generator.dialect(),
            "batch compiled"
        );
        timings.finish();
        Ok(results)
    }

    pub(crate) fn setup(&self, timings: &mut StageTimings) -> EngineResult<Session> {
        let mut env = timings.time("environment", || {
            Environment::from_sources(self.request.sources.iter().cloned())
        });

        if !self.request.imports.is_empty() {
            let text = import_text(&self.request.imports);
            timings
                .time("imports", || synthesize_and_parse(&text, &mut env))
                .map_err(EngineError::Setup)?;
        }

        let global_filter = if self.request.extra_filters.is_empty() {
            None
        } else {
            timings.time("filters", || {
                filters_to_conditional(
                    &self.request.extra_filters,
                    &self.request.parameters,
                    &mut env,
                    BATCH_PROBE,
                )
            })?
        };

        Ok(Session { env, global_filter })
    }

    pub(crate) fn compile_in_transaction(
        &self,
        session: &mut Session,
        index: usize,
        fragment: &QueryFragment,
    ) -> EngineResult<FragmentOutput> {
        let global = session.global_filter.as_ref();
        let mut tx = session.env.begin();
        match self.compile_fragment(&mut tx, index, fragment, global) {
            Ok(output) => {
                let cleaned = tx.commit(self.config.cleanup_local_concepts);
                if !cleaned.is_empty() {
                    debug!(index, cleaned = ?cleaned, "cleaned up local concepts");
                }
                Ok(output)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    fn compile_fragment(
        &self,
        env: &mut Environment,
        index: usize,
        fragment: &QueryFragment,
        global: Option<&Expr>,
    ) -> EngineResult<FragmentOutput> {
        let Some(text) = normalize_fragment(&fragment.text) else {
            return Ok(FragmentOutput::Empty);
        };

        let mut timings = StageTimings::new("query", self.config.performance_logging);
        let mut statements = timings.time("parse", || parse_text(&text, env))?;
        let Some(statement) = statements.pop() else {
            return Ok(FragmentOutput::Empty);
        };

        let output = match statement {
            Statement::RawSql(raw) => FragmentOutput::RawSql(raw.text),
            statement @ (Statement::Show(_) | Statement::Validate(_)) => {
                self.compile_introspection(env, &statement)?
            }
            statement @ (Statement::Select(_)
            | Statement::MultiSelect(_)
            | Statement::Persist(_)) => {
                self.compile_selection(env, index, fragment, statement, global, &mut timings)?
            }
            Statement::Import(_)
            | Statement::Declaration(_)
            | Statement::TypeDeclaration(_)
            | Statement::Datasource(_) => FragmentOutput::Empty,
        };
        timings.finish();
        Ok(output)
    }

    fn compile_introspection(
        &self,
        env: &Environment,
        statement: &Statement,
    ) -> EngineResult<FragmentOutput> {
        Ok(match self.generator.compile_statement(env, statement)? {
            Some(ProcessedStatement::Show(show)) => {
                let sql = match show.kind {
                    ShowKind::QueryText => show.first_value().map(str::to_string),
                    _ => None,
                };
                FragmentOutput::Show(show.into(), sql)
            }
            Some(other) => FragmentOutput::Query {
                sql: Some(self.generator.render(&other)),
                columns: Vec::new(),
            },
            None => FragmentOutput::Empty,
        })
    }

    fn compile_selection(
        &self,
        env: &mut Environment,
        index: usize,
        fragment: &QueryFragment,
        mut statement: Statement,
        global: Option<&Expr>,
        timings: &mut StageTimings,
    ) -> EngineResult<FragmentOutput> {
        let columns = timings.time("columns", || project_columns(env, &statement))?;

        let start = Instant::now();
        apply_default_limit(&mut statement, self.config.default_limit);
        let local = if fragment.extra_filters.is_empty() {
            None
        } else {
            filters_to_conditional(
                &fragment.extra_filters,
                &fragment.parameters,
                env,
                &fragment_probe(index),
            )?
        };
        for select in target_selects(&mut statement) {
            for conditional in [local.as_ref(), global].into_iter().flatten() {
                select.push_where(conditional.clone());
            }
        }
        timings.record("limit_filter", start.elapsed());

        let processed = timings.time("generate", || {
            self.generator.compile_statement(env, &statement)
        })?;
        Ok(FragmentOutput::Query {
            sql: processed.map(|p| self.generator.render(&p)),
            columns,
        })
    }
}

/// Output column metadata, in projection order
pub fn project_columns(env: &Environment, statement: &Statement) -> EngineResult<Vec<OutputColumn>> {
    statement
        .output_components()
        .unwrap_or_default()
        .iter()
        .map(|address| {
            env.concept(address)
                .map(OutputColumn::from)
                .ok_or_else(|| EngineError::from(SemanticError::undefined(address.clone(), Vec::new())))
        })
        .collect()
}

/// Set the row limit if the statement has none; returns whether it did
pub fn apply_default_limit(statement: &mut Statement, limit: u64) -> bool {
    let slot = match statement {
        Statement::Select(select) => &mut select.limit,
        Statement::MultiSelect(multi) => &mut multi.limit,
        Statement::Persist(persist) => &mut persist.select.limit,
        _ => return false,
    };
    if slot.is_some() {
        return false;
    }
    *slot = Some(limit);
    true
}

/// The selects filters apply to: each inner select of a multi-select
pub fn target_selects(statement: &mut Statement) -> Vec<&mut SelectStatement> {
    match statement {
        Statement::Select(select) => vec![select],
        Statement::MultiSelect(multi) => multi.selects.iter_mut().collect(),
        Statement::Persist(persist) => vec![&mut persist.select],
        _ => Vec::new(),
    }
}
