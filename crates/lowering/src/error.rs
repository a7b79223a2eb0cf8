// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for statement planning and SQL generation

use serde::Serialize;

/// Result type alias for lowering operations
pub type LoweringResult<T> = Result<T, LoweringError>;

/// Errors that can occur while compiling a statement to SQL
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum LoweringError {
    /// A referenced concept is not in the Environment
    #[error("Concept '{address}' cannot be resolved")]
    UnresolvableConcept { address: String },

    /// No datasource binds these root concepts
    #[error("No datasource provides: {}", concepts.join(", "))]
    NoDatasource { concepts: Vec<String> },

    /// These concepts are only bound by datasources that share no key with the rest of the query
    #[error("Cannot join a datasource for {}: no shared key concept", concepts.join(", "))]
    NoJoinPath { concepts: Vec<String> },

    /// The statement kind produces no SQL
    #[error("Statement of kind '{kind}' cannot be compiled")]
    UnsupportedStatement { kind: String },

    #[error("Invalid multi-select: {message}")]
    InvalidMultiSelect { message: String },

    /// Syntax feature not supported by the dialect
    #[error("Syntax not supported by {dialect}: {feature}. {suggestion}")]
    UnsupportedSyntax {
        dialect: String,
        feature: String,
        suggestion: String,
    },

    /// Lineage nests deeper than the planner allows (usually a cycle)
    #[error("Recursion limit exceeded: {context} (depth: {depth}, limit: {limit})")]
    RecursionLimitExceeded {
        context: String,
        depth: usize,
        limit: usize,
    },
}

impl LoweringError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LoweringError::UnsupportedSyntax { .. } => ErrorSeverity::Warning,
            LoweringError::UnsupportedStatement { .. } => ErrorSeverity::Info,
            LoweringError::UnresolvableConcept { .. }
            | LoweringError::NoDatasource { .. }
            | LoweringError::NoJoinPath { .. }
            | LoweringError::InvalidMultiSelect { .. }
            | LoweringError::RecursionLimitExceeded { .. } => ErrorSeverity::Error,
        }
    }
}

/// Severity level for lowering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
        }
    }
}
