// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scalar function definitions

use crate::{DataType, FunctionMetadata, FunctionType, ReturnType};

/// Get all builtin scalar functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    vec![
        // String functions
        FunctionMetadata::new("upper", ReturnType::Fixed(DataType::String))
            .with_type(FunctionType::Scalar)
            .with_description("Convert to uppercase"),
        FunctionMetadata::new("lower", ReturnType::Fixed(DataType::String))
            .with_type(FunctionType::Scalar)
            .with_description("Convert to lowercase"),
        FunctionMetadata::new("trim", ReturnType::Fixed(DataType::String))
            .with_type(FunctionType::Scalar)
            .with_description("Remove leading/trailing whitespace"),
        FunctionMetadata::new("length", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("String length"),
        FunctionMetadata::new("concat", ReturnType::Fixed(DataType::String))
            .with_type(FunctionType::Scalar)
            .with_arity(1, None)
            .with_description("Concatenate strings"),
        FunctionMetadata::new("substring", ReturnType::Fixed(DataType::String))
            .with_type(FunctionType::Scalar)
            .with_arity(3, Some(3))
            .with_description("Extract substring"),
        // Numeric functions
        FunctionMetadata::new("abs", ReturnType::SameAsArg(0))
            .with_type(FunctionType::Scalar)
            .with_description("Absolute value"),
        FunctionMetadata::new("round", ReturnType::SameAsArg(0))
            .with_type(FunctionType::Scalar)
            .with_arity(1, Some(2))
            .with_description("Round to the given number of decimals"),
        FunctionMetadata::new("floor", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("Round down to nearest integer"),
        FunctionMetadata::new("ceil", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("Round up to nearest integer"),
        // Null handling
        FunctionMetadata::new("coalesce", ReturnType::FirstKnown)
            .with_type(FunctionType::Scalar)
            .with_arity(1, None)
            .with_description("Return first non-null value"),
        // Date/Time functions
        FunctionMetadata::new("current_date", ReturnType::Fixed(DataType::Date))
            .with_type(FunctionType::Scalar)
            .with_arity(0, Some(0))
            .with_description("Current date"),
        FunctionMetadata::new("current_datetime", ReturnType::Fixed(DataType::Datetime))
            .with_type(FunctionType::Scalar)
            .with_arity(0, Some(0))
            .with_description("Current date and time"),
        FunctionMetadata::new("date", ReturnType::Fixed(DataType::Date))
            .with_type(FunctionType::Scalar)
            .with_description("Truncate a datetime to its date"),
        FunctionMetadata::new("year", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("Year component of a date"),
        FunctionMetadata::new("month", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("Month component of a date"),
        FunctionMetadata::new("day", ReturnType::Fixed(DataType::Integer))
            .with_type(FunctionType::Scalar)
            .with_description("Day-of-month component of a date"),
    ]
}
