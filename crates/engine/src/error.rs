// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for the engine layer
//!
//! [`EngineError`] wraps the errors of every lower layer. Batch compilation
//! records it per fragment; only setup failures reach the caller.

use thiserror::Error;
use trilogy_studio_grammar::SyntaxError;
use trilogy_studio_lowering::LoweringError;
use trilogy_studio_semantic::SemanticError;

use crate::config::ConfigError;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Building the request's baseline Environment failed
    #[error("Failed to prepare environment: {0}")]
    Setup(#[source] SemanticError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Lowering(#[from] LoweringError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("No source named '{0}'")]
    UnknownModel(String),
}

impl EngineError {
    /// The underlying syntax error, if the failure came from the parser
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            EngineError::Semantic(e) | EngineError::Setup(e) => e.as_syntax(),
            EngineError::Filter(FilterError::Semantic(e)) => e.as_syntax(),
            _ => None,
        }
    }
}

/// Errors raised while turning filter strings into a conditional
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// The value would terminate the synthesized `'''` literal early
    #[error("Cannot safely parse strings with triple quotes (parameter '{parameter}')")]
    TripleQuote { parameter: String },

    #[error("Invalid filter: {0}")]
    Semantic(#[from] SemanticError),
}

/// Caller-facing error of a single-query compilation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    Syntax(String),

    #[error("{0}")]
    Other(String),
}

impl From<EngineError> for QueryError {
    fn from(error: EngineError) -> Self {
        match error.as_syntax() {
            Some(syntax) => QueryError::Syntax(syntax.user_message()),
            None => QueryError::Other(error.to_string()),
        }
    }
}
