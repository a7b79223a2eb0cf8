// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Base trait providing shared SQL generation logic for all dialects

use std::fmt;

use trilogy_studio_ir::{DataType, Dialect, DialectFeature};

/// SQL reserved words that must be quoted when used as identifiers
pub const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "constraint", "create", "cross",
    "date", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists", "false",
    "from", "full", "group", "having", "in", "index", "inner", "insert", "into", "is", "join",
    "key", "left", "like", "limit", "not", "null", "on", "or", "order", "outer", "primary",
    "right", "select", "table", "then", "to", "top", "true", "union", "update", "user", "when",
    "where", "with",
];

/// Whether a single identifier part must be quoted
pub fn needs_quoting(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
        || name.is_empty()
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().is_some_and(|c| c.is_numeric())
}

/// How a dialect materializes a persisted select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStyle {
    /// `CREATE OR REPLACE TABLE t AS <select>`
    CreateOrReplace,
    /// `DROP TABLE IF EXISTS t; CREATE TABLE t AS <select>`
    DropAndCreate,
    /// `DROP TABLE IF EXISTS t; SELECT ... INTO t FROM ...`
    SelectInto,
}

/// Dialect-specific SQL generation
///
/// Implementors only supply quoting and type names; everything else has a
/// default that reads the dialect's feature table.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Wrap an identifier part in the dialect's quote characters
    fn quote(&self, name: &str) -> String;

    /// Physical type name for a datatype (traits are ignored)
    fn type_name(&self, datatype: &DataType) -> String;

    /// Quote an identifier only when it needs it
    fn quote_identifier(&self, name: &str) -> String {
        if needs_quoting(name) {
            self.quote(name)
        } else {
            name.to_string()
        }
    }

    /// Quote a dotted table address part by part
    fn quote_table(&self, address: &str) -> String {
        address
            .split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "TRUE" } else { "FALSE" }.to_string()
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn modulo(&self, left: &str, right: &str) -> String {
        format!("{} % {}", left, right)
    }

    /// Render a builtin function call over already rendered arguments
    fn function(&self, name: &str, args: &[String]) -> String {
        let first = args.first().map(String::as_str).unwrap_or_default();
        match name {
            "count_distinct" => format!("COUNT(DISTINCT {})", first),
            "current_date" => "CURRENT_DATE".to_string(),
            "current_datetime" => "CURRENT_TIMESTAMP".to_string(),
            "date" => format!("CAST({} AS {})", first, self.type_name(&DataType::Date)),
            "year" | "month" | "day" => {
                format!("EXTRACT({} FROM {})", name.to_ascii_uppercase(), first)
            }
            _ => format!("{}({})", name.to_ascii_uppercase(), args.join(", ")),
        }
    }

    /// Trailing `LIMIT n`, when the dialect uses one
    fn limit_clause(&self, limit: u64) -> Option<String> {
        self.dialect()
            .supports(DialectFeature::LimitClause)
            .then(|| format!("LIMIT {}", limit))
    }

    /// Leading `TOP n`, when the dialect uses one
    fn top_clause(&self, limit: u64) -> Option<String> {
        self.dialect()
            .supports(DialectFeature::TopClause)
            .then(|| format!("TOP {}", limit))
    }

    fn persist_style(&self) -> PersistStyle {
        if self.dialect().supports(DialectFeature::CreateOrReplace) {
            PersistStyle::CreateOrReplace
        } else {
            PersistStyle::DropAndCreate
        }
    }
}
