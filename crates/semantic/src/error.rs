// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error types for semantic analysis
//!
//! This module defines error types used throughout the semantic analysis layer.

use thiserror::Error;
use trilogy_studio_catalog::CatalogError;
use trilogy_studio_grammar::SyntaxError;
use trilogy_studio_ir::DataType;

/// Result type alias for semantic operations
pub type SemanticResult<T> = Result<T, SemanticError>;

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}?", suggestions.join(", "))
    }
}

/// Errors that can occur while building or querying an Environment
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    /// Text failed to parse (imports and strict parsing)
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// An import could not be resolved
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Reference to a concept that is not in the Environment
    #[error("Undefined concept: {name}{}", did_you_mean(suggestions))]
    UndefinedConcept {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Unknown function: {name}{}", did_you_mean(suggestions))]
    UnknownFunction {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Unknown datatype: {name}{}", did_you_mean(suggestions))]
    UnknownType {
        name: String,
        suggestions: Vec<String>,
    },

    /// Function called with the wrong number of arguments
    #[error("Function '{function}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        function: String,
        expected: String,
        found: usize,
    },

    /// Operator applied to incompatible operand types
    #[error("Cannot apply '{operator}' to {left} and {right}")]
    IncompatibleTypes {
        operator: String,
        left: DataType,
        right: DataType,
    },

    /// A condition or operand that must be boolean is not
    #[error("{context} must be a boolean expression, found {found}")]
    ExpectedBoolean {
        context: &'static str,
        found: DataType,
    },

    /// `-x` over a non-numeric value
    #[error("Cannot negate a value of type {0}")]
    ExpectedNumeric(DataType),

    /// A select-local alias reuses the address of a model concept
    #[error("Cannot define '{name}' in a select; a concept with that name already exists")]
    Shadowing { name: String },

    /// Computed select item without `as <name>`
    #[error("Expression '{expr}' must be named with 'as'")]
    UnaliasedExpression { expr: String },

    /// Datasource references a concept that is not declared
    #[error("Datasource '{datasource}' binds column '{column}' to undefined concept '{concept}'")]
    UnboundColumn {
        datasource: String,
        column: String,
        concept: String,
    },

    #[error("Invalid ALIGN entry '{name}': {reason}")]
    InvalidAlign { name: String, reason: String },

    /// Non-forced add over an existing address
    #[error("Concept '{0}' is already defined")]
    ConceptAlreadyDefined(String),

    #[error("Circular import: {}", chain.join(" -> "))]
    CircularImport { chain: Vec<String> },

    /// Error raised inside an imported module
    #[error("In module '{module}': {source}")]
    InModule {
        module: String,
        #[source]
        source: Box<SemanticError>,
    },
}

impl SemanticError {
    pub fn undefined(name: impl Into<String>, suggestions: Vec<String>) -> Self {
        SemanticError::UndefinedConcept {
            name: name.into(),
            suggestions,
        }
    }

    /// The innermost syntax error, if this error originated in the parser
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            SemanticError::Syntax(e) => Some(e),
            SemanticError::InModule { source, .. } => source.as_syntax(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_concept_with_suggestions() {
        let err = SemanticError::undefined("revnue", vec!["revenue".to_string()]);
        assert_eq!(
            err.to_string(),
            "Undefined concept: revnue; did you mean: revenue?"
        );
    }

    #[test]
    fn test_undefined_concept_without_suggestions() {
        let err = SemanticError::undefined("zzz", vec![]);
        assert_eq!(err.to_string(), "Undefined concept: zzz");
    }

    #[test]
    fn test_error_display_incompatible_types() {
        let err = SemanticError::IncompatibleTypes {
            operator: "+".to_string(),
            left: DataType::String,
            right: DataType::Integer,
        };
        assert_eq!(err.to_string(), "Cannot apply '+' to string and int");
    }

    #[test]
    fn test_error_display_circular_import() {
        let err = SemanticError::CircularImport {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Circular import: a -> b -> a");
    }

    #[test]
    fn test_module_errors_expose_syntax_source() {
        let syntax = SyntaxError::InvalidNumber {
            text: "1e".to_string(),
            span: Default::default(),
        };
        let err = SemanticError::InModule {
            module: "orders".to_string(),
            source: Box::new(SemanticError::Syntax(syntax.clone())),
        };
        assert_eq!(err.as_syntax(), Some(&syntax));
        assert!(err.to_string().starts_with("In module 'orders'"));
    }
}
