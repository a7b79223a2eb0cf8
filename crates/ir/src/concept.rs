// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Concepts
//!
//! A concept is a named, typed field of the model. Concepts are addressed by
//! `<namespace>.<name>`; the namespace may itself be dotted when imports are
//! nested (`game.home_team.id`).

use serde::{Deserialize, Serialize};

use crate::datatype::{DataType, Purpose};
use crate::expr::Expr;

/// Namespace of concepts declared directly in the text being compiled
pub const DEFAULT_NAMESPACE: &str = "local";

/// Names (and namespaces) starting with this marker are private
pub const PRIVATE_PREFIX: char = '_';

/// Build a fully-qualified address
pub fn address_of(namespace: &str, name: &str) -> String {
    format!("{}.{}", namespace, name)
}

/// Split an address into `(namespace, name)`
///
/// Addresses without a dot belong to the default namespace.
pub fn split_address(address: &str) -> (&str, &str) {
    address
        .rsplit_once('.')
        .unwrap_or((DEFAULT_NAMESPACE, address))
}

/// A named, typed field of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Bare name
    pub name: String,

    /// Namespace the concept lives in
    pub namespace: String,

    pub datatype: DataType,

    pub purpose: Purpose,

    /// Expression this concept is computed from, if any
    pub lineage: Option<Expr>,

    /// Key addresses a property hangs off
    #[serde(default)]
    pub keys: Vec<String>,

    /// Description, taken from the declaration's trailing comment
    pub description: Option<String>,

    /// Whether the concept only lives as long as the fragment that declared it
    #[serde(default)]
    pub locally_derived: bool,
}

impl Concept {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        datatype: DataType,
        purpose: Purpose,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            datatype,
            purpose,
            lineage: None,
            keys: Vec::new(),
            description: None,
            locally_derived: false,
        }
    }

    pub fn with_lineage(mut self, lineage: Expr) -> Self {
        self.lineage = Some(lineage);
        self
    }

    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Mark the concept as scoped to the declaring fragment
    pub fn locally_derived(mut self) -> Self {
        self.locally_derived = true;
        self
    }

    /// Fully-qualified address
    pub fn address(&self) -> String {
        address_of(&self.namespace, &self.name)
    }

    /// Bare name in the default namespace, full address otherwise
    pub fn display_name(&self) -> String {
        if self.namespace == DEFAULT_NAMESPACE {
            self.name.clone()
        } else {
            self.address()
        }
    }

    /// Private concepts are hidden from completions and model listings
    pub fn is_private(&self) -> bool {
        self.name.starts_with(PRIVATE_PREFIX) || self.namespace.starts_with(PRIVATE_PREFIX)
    }

    /// Root concepts have no lineage and must be bound by a datasource
    pub fn is_root(&self) -> bool {
        self.lineage.is_none()
    }
}
