// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Synthesized source text
//!
//! Imports, parameter constants and filter probes are handed to the compiler
//! as generated query-language text. Every generated shape is built here and
//! parsed through [`synthesize_and_parse`].
//!
//! | shape | text |
//! |---|---|
//! | import | `import shop as s;` |
//! | constant | `const region <- '''west''';` |
//! | probe | `WHERE (f1) AND (f2) SELECT 1 as __filter_probe_0;` |

use std::fmt::Write as _;

use tracing::debug;
use trilogy_studio_catalog::ImportDirective;
use trilogy_studio_ir::Statement;
use trilogy_studio_semantic::{Environment, SemanticResult, parse_text};

use crate::error::FilterError;
use crate::models::{ParameterValue, Parameters};

const TRIPLE_QUOTE: &str = "'''";

/// Parse generated text against `env`
pub fn synthesize_and_parse(text: &str, env: &mut Environment) -> SemanticResult<Vec<Statement>> {
    debug!(text = %text, "parsing synthesized text");
    parse_text(text, env)
}

/// One `import` statement per directive, one per line
pub fn import_text(imports: &[ImportDirective]) -> String {
    imports
        .iter()
        .map(|import| match &import.alias {
            Some(alias) => format!("import {} as {};", import.name, alias),
            None => format!("import {};", import.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parameter name without its sigil (`:region` → `region`)
pub fn parameter_name(key: &str) -> &str {
    match key.chars().next() {
        Some(c) if !is_identifier_char(c) => &key[c.len_utf8()..],
        _ => key,
    }
}

/// A `const` declaration per parameter, skipping blank names
///
/// # Errors
///
/// [`FilterError::TripleQuote`] if a string value contains `'''`.
pub fn constant_declarations(parameters: &Parameters) -> Result<String, FilterError> {
    let mut out = String::new();
    for (key, value) in parameters {
        let name = parameter_name(key);
        if name.trim().is_empty() {
            continue;
        }
        let literal = match value {
            ParameterValue::String(s) => {
                if s.contains(TRIPLE_QUOTE) {
                    return Err(FilterError::TripleQuote {
                        parameter: name.to_string(),
                    });
                }
                format!("{TRIPLE_QUOTE}{s}{TRIPLE_QUOTE}")
            }
            ParameterValue::Integer(i) => i.to_string(),
            ParameterValue::Float(f) => float_literal(*f),
        };
        let _ = writeln!(out, "const {} <- {};", name, literal);
    }
    Ok(out)
}

fn float_literal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Replace sigil-prefixed parameter references with the bare constant name
///
/// Only whole references outside quoted text are rewritten: `:region` is
/// left alone inside `':region'` and inside `:region_id`.
pub fn strip_parameter_sigils(filter: &str, parameters: &Parameters) -> String {
    let keys: Vec<&str> = parameters
        .keys()
        .map(String::as_str)
        .filter(|key| parameter_name(key) != *key)
        .collect();

    let mut out = String::with_capacity(filter.len());
    let mut rest = filter;
    let mut closing: Option<&str> = None;
    let mut previous: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        let open = closing;
        let step = match open {
            Some(delimiter) if rest.starts_with(delimiter) => {
                closing = None;
                delimiter.len()
            }
            Some("'" | "\"") if c == '\\' => {
                c.len_utf8() + rest[1..].chars().next().map_or(0, char::len_utf8)
            }
            Some(_) => c.len_utf8(),
            None => {
                if let Some(delimiter) = QUOTES.iter().find(|q| rest.starts_with(**q)) {
                    closing = Some(*delimiter);
                    delimiter.len()
                } else if let Some(key) = keys
                    .iter()
                    .find(|key| !previous.is_some_and(is_identifier_char) && is_reference_at(rest, key))
                {
                    out.push_str(parameter_name(key));
                    previous = key.chars().last();
                    rest = &rest[key.len()..];
                    continue;
                } else {
                    c.len_utf8()
                }
            }
        };
        out.push_str(&rest[..step]);
        previous = rest[..step].chars().last();
        rest = &rest[step..];
    }
    out
}

/// Opening and closing delimiters of quoted text, longest first
const QUOTES: &[&str] = &[TRIPLE_QUOTE, "'", "\"", "`"];

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_reference_at(text: &str, key: &str) -> bool {
    text.starts_with(key) && !text[key.len()..].chars().next().is_some_and(is_identifier_char)
}

/// `(f1) AND (f2) ...` over the non-blank filters, or `None` if all are blank
pub fn join_filters<S: AsRef<str>>(filters: &[S]) -> Option<String> {
    let parts: Vec<String> = filters
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .map(|f| format!("({})", f))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

/// Throwaway selection whose WHERE clause carries `condition`
pub fn probe_statement(constants: &str, condition: &str, probe_column: &str) -> String {
    format!("{constants}WHERE {condition} SELECT 1 as {probe_column};")
}
