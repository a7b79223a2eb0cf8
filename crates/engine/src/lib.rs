// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Trilogy Studio - Engine
//!
//! This crate provides the request-level engines behind the editor and the
//! query runner.
//!
//! ## Overview
//!
//! - **Diagnostic Engine**: syntax diagnostics, completions and imports for
//!   text that is usually mid-edit
//! - **Batch Query Compiler**: many independent fragments compiled against
//!   one shared Environment, with filter injection, parameter constants, a
//!   default row limit and per-fragment error isolation
//! - **Helpers**: single-query compilation, formatting, validation with
//!   extra filters, and model summaries
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Caller (CLI, editor integration)      │
//! └──────────────┬───────────────────────────────┘
//!                │ JSON requests
//!                ↓
//! ┌──────────────────────────────────────────────┐
//! │                   Engine                     │
//! ├──────────────────────────────────────────────┤
//! │  • get_diagnostics / validate_query          │
//! │  • compile_batch / compile_single            │
//! │  • format_query / parse_model                │
//! └──────────────┬───────────────────────────────┘
//!                │
//!         ┌──────┴──────┬────────────────┐
//!         ↓             ↓                ↓
//! ┌────────────┐ ┌─────────────┐ ┌──────────────┐
//! │  Grammar   │ │  Semantic   │ │   Lowering   │
//! │  (parse)   │ │(Environment)│ │ (SQL output) │
//! └────────────┘ └─────────────┘ └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trilogy_studio_catalog::{ImportDirective, SourceFragment};
//! use trilogy_studio_engine::{BatchRequest, EngineConfig, QueryFragment, compile_batch};
//!
//! let request = BatchRequest::new(vec![SourceFragment::new(
//!     "facts",
//!     "key x int;\nproperty x.y float;\ndatasource facts (x: x, y: y) grain (x) address db.facts;",
//! )])
//! .with_import(ImportDirective::new("facts"))
//! .with_query(QueryFragment::new("n", "SELECT count(x) as n;"))
//! .with_query(QueryFragment::new("total", "SELECT sum(y) as total;"));
//!
//! let results = compile_batch(&request, &EngineConfig::default()).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].output_columns[0].name, "n");
//! assert_eq!(results[1].output_columns[0].name, "total");
//! ```
//!
//! ### Configuration
//!
//! ```yaml
//! default_limit: 10000
//! max_truncation_retries: 20
//! cleanup_local_concepts: true
//! failure_recovery: rollback
//! performance_logging: false
//! default_dialect: duck_db
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`]: truncating tolerant parse and completion passes
//! - [`batch`]: per-request setup and the per-fragment pipeline
//! - [`filters`]: extra filters and parameters to a conditional
//! - [`synthesis`]: synthesized statement text
//! - [`profiling`]: stage timings on the performance target

pub mod batch;
pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod format;
pub mod model;
pub mod models;
pub mod profiling;
pub mod single;
pub mod synthesis;
pub mod validate;

pub use batch::{BatchCompiler, compile_batch};
pub use completion::CompletionItem;
pub use config::{ConfigError, EngineConfig, FailureRecovery};
pub use diagnostics::{DiagnosticItem, DiagnosticsResponse, Severity, get_diagnostics};
pub use error::{EngineError, EngineResult, FilterError, QueryError};
pub use format::format_query;
pub use model::{LineageItem, ModelSummary, parse_model};
pub use models::{
    BatchRequest, CompiledResult, DiagnosticsRequest, FormatRequest, ModelRequest, OutputColumn,
    ParameterValue, Parameters, QueryFragment, QueryRequest, ShowResults, ValidateRequest,
};
pub use single::compile_single;
pub use validate::validate_query;
