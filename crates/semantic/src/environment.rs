// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Environment
//!
//! The symbol table for one compilation session: concepts keyed by address,
//! datasources keyed by name, declared datatype traits, and the imports that
//! have been applied.
//!
//! ## Redeclaration
//!
//! Addresses are unique. Redeclaring one through [`Environment::declare_concept`]
//! is an explicit override: the replaced concept is recorded in
//! [`Environment::overrides`] and logged. [`Environment::add_concept`] refuses
//! to replace anything unless forced.
//!
//! ```rust
//! use trilogy_studio_ir::{Concept, DataType, Purpose, DEFAULT_NAMESPACE};
//! use trilogy_studio_semantic::Environment;
//!
//! let mut env = Environment::default();
//! env.declare_concept(Concept::new("id", DEFAULT_NAMESPACE, DataType::Integer, Purpose::Key));
//! env.declare_concept(Concept::new("id", DEFAULT_NAMESPACE, DataType::String, Purpose::Key));
//!
//! assert_eq!(env.overrides().len(), 1);
//! assert_eq!(env.concept("local.id").unwrap().datatype, DataType::String);
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;
use trilogy_studio_catalog::{ImportResolver, SourceFragment, StaticResolver};
use trilogy_studio_ir::{
    Concept, DEFAULT_NAMESPACE, DataType, Datasource, ImportStatement, address_of,
};

use crate::error::{SemanticError, SemanticResult};
use crate::resolution::ResolutionConfig;

/// A concept that was replaced by a later declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptOverride {
    pub address: String,
    pub previous: Concept,
}

/// Mutable symbol table for one request
#[derive(Debug, Clone)]
pub struct Environment {
    pub(crate) concepts: IndexMap<String, Concept>,
    pub(crate) datasources: IndexMap<String, Datasource>,
    /// Trait name to the base type it decorates
    pub(crate) types: IndexMap<String, DataType>,
    pub(crate) imports: Vec<ImportStatement>,
    pub(crate) overrides: Vec<ConceptOverride>,
    pub(crate) resolver: Arc<dyn ImportResolver>,
    /// Modules currently being imported, outermost first
    pub(crate) import_stack: Vec<String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Arc::new(StaticResolver::empty()))
    }
}

impl Environment {
    pub fn new(resolver: Arc<dyn ImportResolver>) -> Self {
        Self {
            concepts: IndexMap::new(),
            datasources: IndexMap::new(),
            types: IndexMap::new(),
            imports: Vec::new(),
            overrides: Vec::new(),
            resolver,
            import_stack: Vec::new(),
        }
    }

    /// Environment whose imports resolve against the given fragments
    pub fn from_sources(sources: impl IntoIterator<Item = SourceFragment>) -> Self {
        Self::new(Arc::new(StaticResolver::new(sources)))
    }

    pub fn resolver(&self) -> Arc<dyn ImportResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn concepts(&self) -> &IndexMap<String, Concept> {
        &self.concepts
    }

    pub fn concept(&self, address: &str) -> Option<&Concept> {
        self.concepts.get(address)
    }

    pub fn datasources(&self) -> &IndexMap<String, Datasource> {
        &self.datasources
    }

    pub fn datasource(&self, name: &str) -> Option<&Datasource> {
        self.datasources.get(name)
    }

    /// Base type a declared trait decorates
    pub fn trait_base(&self, name: &str) -> Option<&DataType> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Imports applied to this Environment, in order
    pub fn imports(&self) -> &[ImportStatement] {
        &self.imports
    }

    /// Replaced declarations, in order
    pub fn overrides(&self) -> &[ConceptOverride] {
        &self.overrides
    }

    /// Insert a concept, recording any replaced declaration as an override
    ///
    /// Returns the replaced concept.
    pub fn declare_concept(&mut self, concept: Concept) -> Option<Concept> {
        let address = concept.address();
        let previous = self.concepts.insert(address.clone(), concept)?;
        debug!(address = %address, "concept redeclared, tracking override");
        self.overrides.push(ConceptOverride {
            address,
            previous: previous.clone(),
        });
        Some(previous)
    }

    /// Insert a concept; an existing address is only replaced when `force` is set
    ///
    /// # Errors
    ///
    /// `SemanticError::ConceptAlreadyDefined` if the address exists and
    /// `force` is false.
    pub fn add_concept(&mut self, concept: Concept, force: bool) -> SemanticResult<()> {
        let address = concept.address();
        if !force && self.concepts.contains_key(&address) {
            return Err(SemanticError::ConceptAlreadyDefined(address));
        }
        self.declare_concept(concept);
        Ok(())
    }

    /// Remove a concept by address, keeping the order of the rest
    pub fn remove_concept(&mut self, address: &str) -> Option<Concept> {
        self.concepts.shift_remove(address)
    }

    /// Put a previously removed or replaced concept back without tracking
    pub(crate) fn restore_concept(&mut self, concept: Concept) {
        self.concepts.insert(concept.address(), concept);
    }

    pub fn declare_type(&mut self, name: impl Into<String>, base: DataType) {
        let name = name.into();
        if let Some(previous) = self.types.insert(name.clone(), base) {
            debug!(name = %name, previous = %previous, "datatype trait redeclared");
        }
    }

    pub fn add_datasource(&mut self, datasource: Datasource) -> Option<Datasource> {
        let previous = self
            .datasources
            .insert(datasource.name.clone(), datasource);
        if let Some(previous) = &previous {
            debug!(name = %previous.name, "datasource redeclared");
        }
        previous
    }

    /// Address a reference resolves to
    ///
    /// A reference is either a full address or a bare name in the default
    /// namespace.
    pub fn resolve_address(&self, reference: &str) -> Option<String> {
        if self.concepts.contains_key(reference) {
            return Some(reference.to_string());
        }
        let local = address_of(DEFAULT_NAMESPACE, reference);
        self.concepts.contains_key(&local).then_some(local)
    }

    /// Resolve a reference, failing with suggestions
    pub fn lookup(&self, reference: &str) -> SemanticResult<&Concept> {
        self.resolve_address(reference)
            .and_then(|address| self.concepts.get(&address))
            .ok_or_else(|| SemanticError::undefined(reference, self.suggest(reference)))
    }

    /// Known concept names resembling `reference`
    pub fn suggest(&self, reference: &str) -> Vec<String> {
        let names: Vec<String> = self
            .concepts
            .values()
            .filter(|c| !c.is_private())
            .map(Concept::display_name)
            .collect();
        ResolutionConfig::default().suggest(reference, names.iter().map(String::as_str))
    }
}
