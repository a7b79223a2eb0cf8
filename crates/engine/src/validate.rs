// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Query validation with imports and extra filters
//!
//! The query is checked by the diagnostic engine with the import lines
//! prepended. Each extra filter is then checked on its own, wrapped in a
//! probe statement; its first diagnostic is reported without a position,
//! since the probe text is not part of the editor buffer.

use tracing::debug;
use trilogy_studio_catalog::{ImportDirective, SourceFragment};

use crate::config::EngineConfig;
use crate::diagnostics::{DiagnosticItem, DiagnosticsResponse, get_diagnostics};
use crate::filters::fragment_probe;
use crate::synthesis::{import_text, probe_statement};
use crate::timed_scope;

pub fn validate_query(
    query: &str,
    sources: &[SourceFragment],
    imports: &[ImportDirective],
    extra_filters: &[String],
    config: &EngineConfig,
) -> DiagnosticsResponse {
    timed_scope!("validate_query", config.performance_logging);

    let text = if imports.is_empty() {
        query.to_string()
    } else {
        format!("{}\n{}", import_text(imports), query)
    };
    let mut response = get_diagnostics(&text, sources, config);

    for (index, filter) in extra_filters.iter().enumerate() {
        if filter.trim().is_empty() {
            continue;
        }
        let probe = probe_statement("", filter, &fragment_probe(index));
        let checked = get_diagnostics(&probe, sources, config);
        if let Some(first) = checked.diagnostics.into_iter().next() {
            debug!(index, filter = %filter, "extra filter has diagnostics");
            response
                .diagnostics
                .push(DiagnosticItem::unpositioned(first.message, first.severity));
        }
    }
    response
}
