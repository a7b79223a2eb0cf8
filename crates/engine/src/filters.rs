// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Filter conditionals
//!
//! Raw filter strings are turned into a typed conditional by parsing a probe
//! statement against the shared Environment and keeping its WHERE clause.
//! Parameters become `const` declarations placed before the probe.
//!
//! The probe is parsed inside a transaction that is always rolled back, and
//! parameter constants are inlined into the returned conditional. The
//! Environment is left exactly as it was, so a conditional keeps its
//! parameter values no matter what later fragments declare.
//!
//! ```rust
//! use trilogy_studio_catalog::SourceFragment;
//! use trilogy_studio_engine::filters::filters_to_conditional;
//! use trilogy_studio_engine::models::Parameters;
//! use trilogy_studio_semantic::{Environment, parse_text};
//!
//! let mut env = Environment::from_sources(vec![SourceFragment::new("m", "key x int;")]);
//! parse_text("import m;", &mut env).unwrap();
//!
//! let mut parameters = Parameters::new();
//! parameters.insert(":floor".to_string(), 10i64.into());
//!
//! let conditional = filters_to_conditional(&["x > :floor"], &parameters, &mut env, "__filter_probe_0")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(conditional.to_string(), "(x > 10)");
//! assert!(env.concept("local.floor").is_none());
//! ```

use std::collections::HashMap;

use tracing::debug;
use trilogy_studio_ir::{DEFAULT_NAMESPACE, Expr, Purpose, Statement, address_of};
use trilogy_studio_semantic::Environment;

use crate::error::FilterError;
use crate::models::Parameters;
use crate::synthesis::{
    constant_declarations, join_filters, parameter_name, probe_statement,
    strip_parameter_sigils, synthesize_and_parse,
};

/// Probe column used for request-wide filters
pub const BATCH_PROBE: &str = "__filter_probe_batch";

/// Probe column for the filters of fragment `index`
pub fn fragment_probe(index: usize) -> String {
    format!("__filter_probe_{}", index)
}

/// Compile `filters` into one conditional
///
/// Returns `None` when every filter is blank, or when the probe does not
/// parse to a selection.
///
/// # Errors
///
/// [`FilterError::TripleQuote`] before anything is parsed if a string
/// parameter contains `'''`; [`FilterError::Semantic`] if the probe fails to
/// parse or resolve.
pub fn filters_to_conditional<S: AsRef<str>>(
    filters: &[S],
    parameters: &Parameters,
    env: &mut Environment,
    probe_column: &str,
) -> Result<Option<Expr>, FilterError> {
    let constants = constant_declarations(parameters)?;

    let stripped: Vec<String> = filters
        .iter()
        .map(|f| strip_parameter_sigils(f.as_ref(), parameters))
        .collect();
    let Some(condition) = join_filters(&stripped) else {
        return Ok(None);
    };

    let text = probe_statement(&constants, &condition, probe_column);
    let mut tx = env.begin();
    let mut statements = match synthesize_and_parse(&text, &mut tx) {
        Ok(statements) => statements,
        Err(e) => {
            tx.rollback();
            return Err(e.into());
        }
    };
    let conditional = match statements.pop() {
        Some(Statement::Select(select)) => select.where_clause.map(|w| {
            let mut conditional = w.conditional;
            inline_parameters(&mut conditional, parameters, &tx);
            conditional
        }),
        _ => None,
    };
    tx.rollback();

    debug!(probe = probe_column, filters = stripped.len(), "compiled filter conditional");
    Ok(conditional)
}

/// Replace references to synthesized parameter constants with their values
fn inline_parameters(conditional: &mut Expr, parameters: &Parameters, env: &Environment) {
    let values: HashMap<String, Expr> = parameters
        .keys()
        .map(|key| address_of(DEFAULT_NAMESPACE, parameter_name(key)))
        .filter_map(|address| {
            let concept = env.concept(&address)?;
            let value = concept.lineage.clone()?;
            (concept.purpose == Purpose::Constant).then_some((address, value))
        })
        .collect();
    conditional.substitute_concepts(&mut |c| values.get(&c.address).cloned());
}
