// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock import resolver for testing
//!
//! Serves modules from memory and records every resolution request, so tests
//! can check that imports are resolved lazily.

use std::collections::HashMap;
use std::sync::Mutex;

use trilogy_studio_catalog::{CatalogError, CatalogResult, ImportResolver};

/// In-memory resolver that records requests
#[derive(Debug, Default)]
pub struct MockResolver {
    modules: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn builder() -> MockResolverBuilder {
        MockResolverBuilder::default()
    }

    /// Module names requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ImportResolver for MockResolver {
    fn resolve(&self, module: &str) -> CatalogResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(module.to_string());
        }
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| CatalogError::ModuleNotFound {
                name: module.to_string(),
                available: self.modules(),
            })
    }

    fn modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Builder for [`MockResolver`]
#[derive(Debug, Default)]
pub struct MockResolverBuilder {
    modules: HashMap<String, String>,
}

impl MockResolverBuilder {
    pub fn with_module(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.insert(name.into(), text.into());
        self
    }

    pub fn build(self) -> MockResolver {
        MockResolver {
            modules: self.modules,
            requests: Mutex::new(Vec::new()),
        }
    }
}
