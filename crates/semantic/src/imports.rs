// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Import resolution
//!
//! `import m;` merges module `m` into the importing namespace unchanged.
//! `import m as a;` re-roots every namespace of `m` under `a`: `local.x`
//! becomes `a.x` and `inner.x` becomes `a.inner.x`. Lineage, property keys,
//! datasource bindings and grains are rewritten with the same mapping.
//!
//! Modules are resolved lazily through the Environment's [`ImportResolver`]
//! and parsed strictly in a child Environment.
//!
//! [`ImportResolver`]: trilogy_studio_catalog::ImportResolver

use tracing::debug;
use trilogy_studio_ir::{DEFAULT_NAMESPACE, ImportStatement, address_of, split_address};

use crate::Environment;
use crate::error::{SemanticError, SemanticResult};

/// Namespace after importing under `alias`
pub fn reroot_namespace(namespace: &str, alias: Option<&str>) -> String {
    match alias {
        None => namespace.to_string(),
        Some(alias) if namespace == DEFAULT_NAMESPACE => alias.to_string(),
        Some(alias) => format!("{}.{}", alias, namespace),
    }
}

/// Address after importing under `alias`
pub fn reroot_address(address: &str, alias: Option<&str>) -> String {
    let (namespace, name) = split_address(address);
    address_of(&reroot_namespace(namespace, alias), name)
}

impl Environment {
    /// Import a module by name, optionally re-rooted under `alias`
    ///
    /// # Errors
    ///
    /// - `SemanticError::CircularImport` if the module is already being imported
    /// - `SemanticError::Catalog` if the resolver does not know the module
    /// - `SemanticError::InModule` wrapping any error raised by the module text
    pub fn import(&mut self, path: &str, alias: Option<&str>) -> SemanticResult<()> {
        if self.import_stack.iter().any(|m| m == path) {
            let mut chain = self.import_stack.clone();
            chain.push(path.to_string());
            return Err(SemanticError::CircularImport { chain });
        }

        let text = self.resolver.resolve(path)?;
        let mut module = Environment::new(self.resolver());
        module.import_stack = self.import_stack.clone();
        module.import_stack.push(path.to_string());

        crate::parse_text(&text, &mut module).map_err(|e| SemanticError::InModule {
            module: path.to_string(),
            source: Box::new(e),
        })?;

        debug!(
            module = %path,
            alias = ?alias,
            concepts = module.concepts.len(),
            datasources = module.datasources.len(),
            "merging imported module"
        );
        self.merge(module, alias);
        self.imports.push(ImportStatement {
            path: path.to_string(),
            alias: alias.map(str::to_string),
        });
        Ok(())
    }

    fn merge(&mut self, module: Environment, alias: Option<&str>) {
        for (name, base) in module.types {
            self.types.entry(name).or_insert(base);
        }

        for concept in module.concepts.into_values() {
            if concept.locally_derived {
                continue;
            }
            let mut concept = concept;
            concept.namespace = reroot_namespace(&concept.namespace, alias);
            concept.keys = concept
                .keys
                .iter()
                .map(|k| reroot_address(k, alias))
                .collect();
            if let Some(lineage) = concept.lineage.as_mut() {
                lineage.map_concepts(&mut |c| c.address = reroot_address(&c.address, alias));
            }

            // the same module imported twice yields identical concepts
            if self.concepts.get(&concept.address()) != Some(&concept) {
                self.declare_concept(concept);
            }
        }

        for datasource in module.datasources.into_values() {
            let mut datasource = datasource;
            if let Some(alias) = alias {
                datasource.name = format!("{}.{}", alias, datasource.name);
            }
            for binding in &mut datasource.columns {
                binding.concept = reroot_address(&binding.concept, alias);
            }
            datasource.grain = datasource
                .grain
                .iter()
                .map(|g| reroot_address(g, alias))
                .collect();
            self.add_datasource(datasource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reroot_default_namespace() {
        assert_eq!(reroot_address("local.id", Some("game")), "game.id");
        assert_eq!(reroot_address("local.id", None), "local.id");
    }

    #[test]
    fn test_reroot_nested_namespace() {
        assert_eq!(
            reroot_address("home_team.id", Some("game")),
            "game.home_team.id"
        );
        assert_eq!(reroot_namespace("home_team", Some("game")), "game.home_team");
    }
}
