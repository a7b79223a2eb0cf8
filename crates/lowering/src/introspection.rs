// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `SHOW CONCEPTS`, `SHOW DATASOURCES` and `VALIDATE ALL`
//!
//! These statements never reach a database: they are answered from the
//! Environment as rows of text.

use tracing::debug;
use trilogy_studio_ir::{Dialect, SelectStatement};
use trilogy_studio_semantic::Environment;

use crate::context::LoweringContext;
use crate::planner::Planner;

/// What an introspection statement shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    /// The SQL a select compiles to, as a single cell
    QueryText,
    Concepts,
    Datasources,
    Validation,
}

/// Structured introspection output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedShow {
    pub kind: ShowKind,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ProcessedShow {
    pub fn query_text(sql: String) -> Self {
        Self {
            kind: ShowKind::QueryText,
            columns: vec!["query_text".to_string()],
            rows: vec![vec![sql]],
        }
    }

    /// Text of the first cell, if any
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first()?.first().map(String::as_str)
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Every non-private concept, ordered by address
pub fn show_concepts(env: &Environment) -> ProcessedShow {
    let mut rows: Vec<Vec<String>> = env
        .concepts()
        .values()
        .filter(|c| !c.is_private())
        .map(|c| {
            vec![
                c.address(),
                c.datatype.to_string(),
                c.purpose.to_string(),
                c.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    rows.sort();
    ProcessedShow {
        kind: ShowKind::Concepts,
        columns: columns(&["address", "datatype", "purpose", "description"]),
        rows,
    }
}

pub fn show_datasources(env: &Environment) -> ProcessedShow {
    let rows = env
        .datasources()
        .values()
        .map(|ds| {
            vec![
                ds.name.clone(),
                ds.address.clone(),
                ds.columns
                    .iter()
                    .map(|b| format!("{}: {}", b.column, b.concept))
                    .collect::<Vec<_>>()
                    .join(", "),
                ds.grain.join(", "),
            ]
        })
        .collect();
    ProcessedShow {
        kind: ShowKind::Datasources,
        columns: columns(&["name", "address", "columns", "grain"]),
        rows,
    }
}

/// Check that every datasource is well formed and every concept can be queried
pub fn validate_all(env: &Environment, dialect: Dialect) -> ProcessedShow {
    let mut ctx = LoweringContext::new(dialect);
    let mut rows = Vec::new();

    for ds in env.datasources().values() {
        let mut problems = Vec::new();
        for binding in &ds.columns {
            if env.concept(&binding.concept).is_none() {
                problems.push(format!(
                    "column '{}' binds unknown concept '{}'",
                    binding.column, binding.concept
                ));
            }
        }
        for grain in &ds.grain {
            if !ds.binds(grain) {
                problems.push(format!("grain concept '{}' is not bound", grain));
            }
        }
        let status = if problems.is_empty() { "ok" } else { "error" };
        rows.push(vec![
            "datasource".to_string(),
            ds.name.clone(),
            status.to_string(),
            problems.join("; "),
        ]);
    }

    for concept in env.concepts().values().filter(|c| !c.is_private()) {
        let select = SelectStatement {
            selection: vec![concept.address()],
            ..Default::default()
        };
        let (status, message) = match Planner::new(env, dialect).plan_select(&select) {
            Ok(_) => ("ok", String::new()),
            Err(e) => {
                let result = (e.severity().as_str(), e.to_string());
                ctx.add_error(e);
                result
            }
        };
        rows.push(vec![
            "concept".to_string(),
            concept.address(),
            status.to_string(),
            message,
        ]);
    }

    debug!(
        checked = rows.len(),
        failures = ctx.errors().len(),
        "validated environment"
    );
    ProcessedShow {
        kind: ShowKind::Validation,
        columns: columns(&["kind", "name", "status", "message"]),
        rows,
    }
}
