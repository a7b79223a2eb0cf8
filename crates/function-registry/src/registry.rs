// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::{FunctionMetadata, FunctionType, builtin};
use std::collections::HashMap;

/// Function registry for builtin functions
///
/// This struct stores and provides lookup for the builtin functions of the
/// query language.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    /// Functions keyed by lowercase name
    functions: HashMap<String, FunctionMetadata>,
}

impl FunctionRegistry {
    /// Create a new function registry with all builtin functions loaded
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use trilogy_studio_function_registry::FunctionRegistry;
    ///
    /// let registry = FunctionRegistry::new();
    /// let count = registry.get_function("COUNT");
    /// ```
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        for function in builtin::aggregate::all_functions()
            .into_iter()
            .chain(builtin::scalar::all_functions())
        {
            registry.register(function);
        }

        registry
    }

    /// Add (or replace) a function definition
    pub fn register(&mut self, function: FunctionMetadata) {
        self.functions
            .insert(function.name.to_ascii_lowercase(), function);
    }

    /// Lookup a single function by name
    ///
    /// # Arguments
    ///
    /// * `name` - The function name to lookup (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(&FunctionMetadata)` if found, `None` otherwise
    pub fn get_function(&self, name: &str) -> Option<&FunctionMetadata> {
        self.functions.get(&name.to_ascii_lowercase())
    }

    /// Check if a function exists
    pub fn has_function(&self, name: &str) -> bool {
        self.get_function(name).is_some()
    }

    /// Check if a function is a builtin aggregate
    pub fn is_aggregate(&self, name: &str) -> bool {
        self.get_function(name)
            .is_some_and(|f| f.function_type == FunctionType::Aggregate)
    }

    /// All function names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry() {
        let registry = FunctionRegistry::new();
        assert!(registry.has_function("count"));
        assert!(registry.has_function("upper"));
        assert!(!registry.names().is_empty());
    }

    #[test]
    fn test_get_function_case_insensitive() {
        let registry = FunctionRegistry::new();

        // All should return the same function
        let upper = registry.get_function("COUNT");
        let lower = registry.get_function("count");
        let mixed = registry.get_function("Count");

        assert!(upper.is_some());
        assert_eq!(upper, lower);
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_is_aggregate() {
        let registry = FunctionRegistry::new();

        assert!(registry.is_aggregate("sum"));
        assert!(registry.is_aggregate("COUNT_DISTINCT"));
        assert!(!registry.is_aggregate("upper"));
        assert!(!registry.is_aggregate("nonexistent"));
    }
}
