// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Resolver
//!
//! This module provides an in-memory resolver over the source fragments that
//! arrive with a request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trilogy_studio_catalog::StaticResolver;
//!
//! let resolver = StaticResolver::new(request.sources.clone());
//! let text = resolver.resolve("game.team")?;
//! ```

use indexmap::IndexMap;
use tracing::warn;

use crate::source::{SourceFragment, is_valid_module_name};
use crate::{CatalogError, CatalogResult, ImportResolver};

/// Resolver backed by request-supplied fragments
///
/// Fragments keep their arrival order. A later fragment with the same alias
/// replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    sources: IndexMap<String, String>,
}

impl StaticResolver {
    pub fn new(fragments: impl IntoIterator<Item = SourceFragment>) -> Self {
        let mut sources = IndexMap::new();
        for fragment in fragments {
            if sources
                .insert(fragment.alias.clone(), fragment.contents)
                .is_some()
            {
                warn!(alias = %fragment.alias, "duplicate source fragment, keeping the last one");
            }
        }
        Self { sources }
    }

    /// Resolver with no modules
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ImportResolver for StaticResolver {
    fn resolve(&self, module: &str) -> CatalogResult<String> {
        if !is_valid_module_name(module) {
            return Err(CatalogError::InvalidModuleName(module.to_string()));
        }
        self.sources
            .get(module)
            .cloned()
            .ok_or_else(|| CatalogError::ModuleNotFound {
                name: module.to_string(),
                available: self.modules(),
            })
    }

    fn modules(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }
}
