// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Single-query compilation
//!
//! Runs one fragment through the batch pipeline and reports failures as
//! [`QueryError`], separating syntax errors from everything else.

use crate::batch::BatchCompiler;
use crate::config::EngineConfig;
use crate::error::QueryError;
use crate::models::{BatchRequest, CompiledResult, QueryRequest};
use crate::profiling::StageTimings;

/// Compile exactly one fragment
///
/// # Errors
///
/// [`QueryError::Syntax`] when the text (or an import it pulls in) fails to
/// parse, [`QueryError::Other`] for every other failure.
pub fn compile_single(request: &QueryRequest, config: &EngineConfig) -> Result<CompiledResult, QueryError> {
    let batch = BatchRequest {
        sources: request.sources.clone(),
        imports: request.imports.clone(),
        dialect: request.dialect,
        ..Default::default()
    };
    let compiler = BatchCompiler::new(&batch, config);

    let mut timings = StageTimings::new("single", config.performance_logging);
    let mut session = compiler.setup(&mut timings)?;
    let output = timings.time("query", || {
        compiler.compile_in_transaction(&mut session, 0, &request.query)
    })?;
    timings.finish();

    Ok(output.into_result(&request.query.label))
}
