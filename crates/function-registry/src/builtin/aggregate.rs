// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Aggregate function definitions

use crate::{DataType, FunctionMetadata, FunctionType, ReturnType};

/// Get all builtin aggregate functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    vec![
        FunctionMetadata::new("count", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Aggregate)
            .with_description("Count the number of non-null values"),
        FunctionMetadata::new("count_distinct", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Aggregate)
            .with_description("Count the number of distinct values"),
        FunctionMetadata::new("sum", ReturnType::SameAsArg(0))
            .with_type(FunctionType::Aggregate)
            .with_description("Sum of values"),
        FunctionMetadata::new("avg", ReturnType::Fixed(DataType::Float))
            .with_type(FunctionType::Aggregate)
            .with_description("Average of values"),
        FunctionMetadata::new("min", ReturnType::SameAsArg(0))
            .with_type(FunctionType::Aggregate)
            .with_description("Minimum value"),
        FunctionMetadata::new("max", ReturnType::SameAsArg(0))
            .with_type(FunctionType::Aggregate)
            .with_description("Maximum value"),
    ]
}
