// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Diagnostic Engine
//!
//! Editor feedback for text that is usually mid-edit and often invalid.
//!
//! ## Architecture
//!
//! ```text
//! text ─→ tolerant parse ──(terminal error)──→ truncate at previous ';' ─┐
//!              ↑                                                          │
//!              └──────────────────── retry (bounded) ─────────────────────┘
//!              │
//!              ↓ parse tree
//!   baseline completions → tolerant build (declarations, imports) → new completions
//! ```
//!
//! Recoverable syntax errors become [`DiagnosticItem`]s. Statements that fail
//! to build in the second pass are logged and skipped. The engine never
//! returns an error; the worst case is an empty response.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trilogy_studio_catalog::{ImportDirective, SourceFragment};
use trilogy_studio_grammar::{ParseTree, StatementSyntax, SyntaxError, parse_with_recovery};
use trilogy_studio_semantic::{Environment, build_tolerant};

use crate::completion::{CompletionItem, CompletionRenderer};
use crate::config::EngineConfig;
use crate::profiling::StageTimings;

/// Diagnostic severity, serialized as the editor's numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    Error = 8,
    Warning = 4,
    Information = 2,
    Hint = 1,
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity as u8
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            8 => Ok(Severity::Error),
            4 => Ok(Severity::Warning),
            2 => Ok(Severity::Information),
            1 => Ok(Severity::Hint),
            other => Err(format!("invalid severity {}", other)),
        }
    }
}

/// A located message; positions are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticItem {
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
    pub message: String,
    pub severity: Severity,
}

impl DiagnosticItem {
    pub fn from_syntax(error: &SyntaxError) -> Self {
        let span = error.span();
        Self {
            start_line_number: span.start.line,
            start_column: span.start.column,
            end_line_number: span.end.line,
            end_column: span.end.column,
            message: error.user_message(),
            severity: Severity::Error,
        }
    }

    /// A diagnostic that is not tied to a position
    pub fn unpositioned(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            start_line_number: 0,
            start_column: 0,
            end_line_number: 0,
            end_column: 0,
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub diagnostics: Vec<DiagnosticItem>,
    pub completions: Vec<CompletionItem>,
    pub imports: Vec<ImportDirective>,
}

/// Diagnostics, completions and imports for `text`
pub fn get_diagnostics(
    text: &str,
    sources: &[SourceFragment],
    config: &EngineConfig,
) -> DiagnosticsResponse {
    let mut timings = StageTimings::new("diagnostics", config.performance_logging);
    let mut env = timings.time("environment", || {
        Environment::from_sources(sources.iter().cloned())
    });

    let mut response = DiagnosticsResponse::default();
    let tree = timings.time("parse", || {
        parse_with_truncation(text, config.max_truncation_retries, &mut response.diagnostics)
    });
    let Some(tree) = tree else {
        timings.finish();
        return response;
    };

    let mut seen = HashSet::new();
    response.completions = CompletionRenderer::render_new(&env, &mut seen);

    response.imports = collect_imports(&tree);

    let build = timings.time("build", || build_tolerant(&tree, &mut env));
    for error in &build.errors {
        warn!(error = %error, "statement skipped while building completions");
    }

    response
        .completions
        .extend(CompletionRenderer::render_new(&env, &mut seen));

    debug!(
        diagnostics = response.diagnostics.len(),
        completions = response.completions.len(),
        imports = response.imports.len(),
        "diagnostics computed"
    );
    timings.finish();
    response
}

/// Tolerant parse, truncating at the previous `;` after each terminal error
///
/// At most `max_attempts` parses are made. If none yields a tree, the first
/// terminal error is reported as a diagnostic and `None` is returned.
pub fn parse_with_truncation(
    text: &str,
    max_attempts: usize,
    diagnostics: &mut Vec<DiagnosticItem>,
) -> Option<ParseTree> {
    let mut candidate = text;
    let mut first_terminal: Option<SyntaxError> = None;

    for attempt in 0..max_attempts {
        let result = parse_with_recovery(candidate, &mut |error| {
            push_unique(diagnostics, DiagnosticItem::from_syntax(error));
            true
        });
        match result {
            Ok(tree) => return Some(tree),
            Err(error) => {
                debug!(attempt, error = %error, "terminal syntax error");
                first_terminal.get_or_insert(error);
                match truncate_to_previous_terminator(candidate) {
                    Some(shorter) => candidate = shorter,
                    None => break,
                }
            }
        }
    }

    if let Some(error) = first_terminal {
        push_unique(diagnostics, DiagnosticItem::from_syntax(&error));
    }
    None
}

/// `text` cut just after the last `;` that precedes its final statement
///
/// Trailing whitespace and runs of empty statements are skipped first, so
/// the result is always strictly shorter than the meaningful content of
/// `text`. `None` if there is no earlier terminator.
pub fn truncate_to_previous_terminator(text: &str) -> Option<&str> {
    let body = text.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    let cut = body.rfind(';')?;
    Some(&text[..=cut])
}

fn push_unique(diagnostics: &mut Vec<DiagnosticItem>, item: DiagnosticItem) {
    if !diagnostics.contains(&item) {
        diagnostics.push(item);
    }
}

fn collect_imports(tree: &ParseTree) -> Vec<ImportDirective> {
    tree.statements
        .iter()
        .filter_map(|statement| match &statement.kind {
            StatementSyntax::Import { path, alias } => Some(ImportDirective {
                name: path.clone(),
                alias: alias.clone(),
            }),
            _ => None,
        })
        .collect()
}
