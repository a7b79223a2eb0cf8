// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Datasources bind physical table columns to concepts.

use serde::{Deserialize, Serialize};

/// One `column: concept` binding inside a datasource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnBinding {
    pub column: String,
    /// Address of the bound concept
    pub concept: String,
}

/// A physical table that can provide values for a set of concepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datasource {
    /// Identifier (namespaced when imported, e.g. `game.games_sr`)
    pub name: String,

    pub columns: Vec<ColumnBinding>,

    /// Concept addresses that uniquely identify a row
    pub grain: Vec<String>,

    /// Physical table address, e.g. `project.dataset.table`
    pub address: String,
}

impl Datasource {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            grain: Vec::new(),
            address: address.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>, concept: impl Into<String>) -> Self {
        self.columns.push(ColumnBinding {
            column: column.into(),
            concept: concept.into(),
        });
        self
    }

    pub fn with_grain(mut self, grain: Vec<String>) -> Self {
        self.grain = grain;
        self
    }

    /// Column bound to the given concept address
    pub fn column_for(&self, concept: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|b| b.concept == concept)
            .map(|b| b.column.as_str())
    }

    pub fn binds(&self, concept: &str) -> bool {
        self.column_for(concept).is_some()
    }

    /// Addresses of all bound concepts, in declaration order
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|b| b.concept.as_str())
    }

    /// SQL-safe alias derived from the datasource name
    pub fn alias(&self) -> String {
        self.name.replace('.', "_")
    }
}
