// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Trilogy Studio - Semantic Layer
//!
//! This crate owns the [`Environment`] (the symbol table of one request) and
//! turns parse trees into typed [`Statement`]s against it.
//!
//! ## Overview
//!
//! - **Environment**: concepts, datasources and datatype traits, with
//!   tracked overrides and lazy import resolution
//! - **Statement building**: name resolution with "did you mean"
//!   suggestions, type checking, purpose inference
//! - **Transactions**: scoped checkouts that commit (optionally cleaning up
//!   locally derived concepts) or roll back to a snapshot
//!
//! ## Usage
//!
//! ```rust
//! use trilogy_studio_catalog::SourceFragment;
//! use trilogy_studio_semantic::{Environment, parse_text};
//!
//! let mut env = Environment::from_sources(vec![SourceFragment::new(
//!     "orders",
//!     "key order_id int;\nproperty order_id.amount float;",
//! )]);
//!
//! let statements = parse_text("import orders;\nselect order_id, sum(amount) as total;", &mut env).unwrap();
//! assert_eq!(statements.len(), 2);
//! assert!(env.concept("local.total").unwrap().locally_derived);
//! ```
//!
//! [`Statement`]: trilogy_studio_ir::Statement

pub mod environment;
pub mod error;
pub mod imports;
pub mod resolution;
pub mod transaction;
pub mod transform;
pub mod typing;

pub use environment::{ConceptOverride, Environment};
pub use error::{SemanticError, SemanticResult};
pub use resolution::{Candidate, MatchKind, ResolutionConfig};
pub use transaction::EnvironmentTransaction;
pub use transform::{StatementBuilder, TolerantBuild};
pub use typing::{contains_aggregate, infer_type, registry};

use trilogy_studio_grammar::ParseTree;
use trilogy_studio_ir::Statement;

/// Parse `text` strictly and build its statements against `env`
///
/// # Errors
///
/// The first syntax or semantic error. Statements before the failing one
/// have already been applied to `env`.
pub fn parse_text(text: &str, env: &mut Environment) -> SemanticResult<Vec<Statement>> {
    let tree = trilogy_studio_grammar::parse(text)?;
    StatementBuilder::new(env).build_all(&tree)
}

/// Build an already parsed tree, skipping statements that fail
pub fn build_tolerant(tree: &ParseTree, env: &mut Environment) -> TolerantBuild {
    StatementBuilder::new(env).build_tolerant(tree)
}
