// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// No source fragment is registered under the requested name
    #[error("Module '{name}' not found; available modules: [{}]", available.join(", "))]
    ModuleNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Module names are dotted identifiers
    #[error("Invalid module name: '{0}'")]
    InvalidModuleName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_not_found_display() {
        let error = CatalogError::ModuleNotFound {
            name: "customers".to_string(),
            available: vec!["orders".to_string(), "game.team".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Module 'customers' not found; available modules: [orders, game.team]"
        );
    }

    #[test]
    fn test_invalid_module_name_display() {
        let error = CatalogError::InvalidModuleName("bad name".to_string());
        assert_eq!(error.to_string(), "Invalid module name: 'bad name'");
    }

    #[test]
    fn test_serializes_variant_name() {
        let error = CatalogError::InvalidModuleName("x y".to_string());
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["InvalidModuleName"], "x y");
    }
}
