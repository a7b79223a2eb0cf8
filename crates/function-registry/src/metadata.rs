// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

use crate::DataType;

/// Function type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    Scalar,
    Aggregate,
}

/// How a function's return type is derived from its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnType {
    /// Always the given type
    Fixed(DataType),
    /// Same type as the argument at this position (traits dropped)
    SameAsArg(usize),
    /// First argument type that is not `Unknown`
    FirstKnown,
}

/// Builtin function metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Function name, lowercase
    pub name: String,
    pub function_type: FunctionType,
    pub return_type: ReturnType,
    /// Minimum number of arguments
    pub min_args: usize,
    /// Maximum number of arguments (`None` means variadic)
    pub max_args: Option<usize>,
    pub description: String,
}

impl FunctionMetadata {
    /// Create new function metadata with builder pattern
    ///
    /// Defaults to a unary scalar function.
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            function_type: FunctionType::Scalar,
            return_type,
            min_args: 1,
            max_args: Some(1),
            description: String::new(),
        }
    }

    pub fn with_type(mut self, function_type: FunctionType) -> Self {
        self.function_type = function_type;
        self
    }

    pub fn with_arity(mut self, min_args: usize, max_args: Option<usize>) -> Self {
        self.min_args = min_args;
        self.max_args = max_args;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_aggregate(&self) -> bool {
        self.function_type == FunctionType::Aggregate
    }

    /// Whether `count` arguments are accepted
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }

    /// Human-readable arity, e.g. `1`, `1..3`, `1+`
    pub fn arity_display(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("{}+", self.min_args),
        }
    }

    /// Return type for the given argument types
    pub fn resolve_return_type(&self, args: &[DataType]) -> DataType {
        match &self.return_type {
            ReturnType::Fixed(ty) => ty.clone(),
            ReturnType::SameAsArg(idx) => args
                .get(*idx)
                .map(|t| t.base().clone())
                .unwrap_or(DataType::Unknown),
            ReturnType::FirstKnown => args
                .iter()
                .find(|t| !t.is_unknown())
                .map(|t| t.base().clone())
                .unwrap_or(DataType::Unknown),
        }
    }
}
