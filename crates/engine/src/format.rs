// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Canonical formatting of query text

use tracing::debug;
use trilogy_studio_catalog::SourceFragment;
use trilogy_studio_semantic::{Environment, SemanticError, StatementBuilder};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::profiling::StageTimings;

/// Render `text` back to canonical form, one statement per paragraph
///
/// The statements are built against `sources` first, so text that
/// references unknown concepts is rejected rather than reformatted.
///
/// # Errors
///
/// The first syntax or semantic error in `text`.
pub fn format_query(text: &str, sources: &[SourceFragment], config: &EngineConfig) -> EngineResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(String::new());
    }

    let mut timings = StageTimings::new("format", config.performance_logging);
    let mut env = timings.time("environment", || {
        Environment::from_sources(sources.iter().cloned())
    });
    let tree = timings
        .time("parse", || trilogy_studio_grammar::parse(text))
        .map_err(SemanticError::Syntax)?;
    timings.time("build", || StatementBuilder::new(&mut env).build_all(&tree))?;

    let rendered = tree.render();
    debug!(statements = tree.statements.len(), "formatted query");
    timings.finish();
    Ok(rendered)
}
