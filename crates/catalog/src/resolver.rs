// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Import resolution
//!
//! This module defines the trait the Environment uses to fetch module text
//! when it encounters an `import` statement.

use std::fmt::Debug;

use crate::error::CatalogResult;

/// Source of importable module text
///
/// Implementations must be cheap to call repeatedly; the Environment may
/// resolve the same module several times while rebuilding.
///
/// # Examples
///
/// ```rust
/// use trilogy_studio_catalog::{CatalogError, CatalogResult, ImportResolver};
///
/// #[derive(Debug)]
/// struct Single;
///
/// impl ImportResolver for Single {
///     fn resolve(&self, module: &str) -> CatalogResult<String> {
///         match module {
///             "orders" => Ok("key order_id int;".to_string()),
///             other => Err(CatalogError::ModuleNotFound {
///                 name: other.to_string(),
///                 available: self.modules(),
///             }),
///         }
///     }
///
///     fn modules(&self) -> Vec<String> {
///         vec!["orders".to_string()]
///     }
/// }
///
/// assert!(Single.resolve("orders").is_ok());
/// ```
pub trait ImportResolver: Debug + Send + Sync {
    /// Text of the named module
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ModuleNotFound` if no module has that name.
    /// Returns `CatalogError::InvalidModuleName` if the name is malformed.
    fn resolve(&self, module: &str) -> CatalogResult<String>;

    /// Names of all resolvable modules
    fn modules(&self) -> Vec<String>;
}
