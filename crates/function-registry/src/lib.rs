// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Function Registry
//!
//! This crate provides a centralized registry for the builtin functions of the
//! query language. Functions are dialect-agnostic at this level; the lowering
//! crate decides how each one is spelled in a given SQL dialect.
//!
//! ## Features
//!
//! - Aggregate and scalar function definitions
//! - Arity bounds and return type rules, used by semantic analysis
//! - Case-insensitive lookup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trilogy_studio_function_registry::FunctionRegistry;
//!
//! let registry = FunctionRegistry::new();
//! assert!(registry.is_aggregate("sum"));
//! ```

pub mod builtin;
pub mod metadata;
pub mod registry;

pub use metadata::{FunctionMetadata, FunctionType, ReturnType};
pub use registry::FunctionRegistry;

// Re-exports from ir for convenience
pub use trilogy_studio_ir::DataType;
