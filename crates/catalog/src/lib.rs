// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Trilogy Studio - Catalog Layer
//!
//! This crate provides the model sources an Environment imports from. It
//! defines the `ImportResolver` trait and the request-level types used for:
//!
//! - **Source fragments**: named chunks of model text supplied with a request
//! - **Import directives**: `{name, alias}` pairs naming a fragment to import
//! - **Static resolution**: an in-memory resolver over the request's fragments
//!
//! ## Architecture
//!
//! The catalog layer is responsible for:
//! - Mapping module names to source text
//! - Reporting unknown modules with the names that are available
//!
//! Resolution is lazy: the semantic layer asks for a module's text only when
//! an `import` statement names it. No database access ever happens here.
//!
//! ## Usage
//!
//! ```rust
//! use trilogy_studio_catalog::{ImportResolver, SourceFragment, StaticResolver};
//!
//! let resolver = StaticResolver::new(vec![SourceFragment::new("orders", "key order_id int;")]);
//! assert_eq!(resolver.resolve("orders").unwrap(), "key order_id int;");
//! assert!(resolver.resolve("customers").is_err());
//! ```

pub mod error;
pub mod resolver;
pub mod source;
pub mod r#static;

pub use error::{CatalogError, CatalogResult};
pub use resolver::ImportResolver;
pub use source::{ImportDirective, SourceFragment};
pub use r#static::StaticResolver;
