// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Model summaries
//!
//! Parses one source module and lists what it exposes: every non-private
//! concept with its lineage flattened into display tokens, plus the
//! module's datasources.
//!
//! ## Lineage tokens
//!
//! ```text
//! metric revenue <- sum(amount);
//!
//! sum   (   amount   )
//!  1    1     2      1     ← depth
//! ```
//!
//! A referenced concept that is itself derived is followed by `<-` and its
//! own lineage one level deeper.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trilogy_studio_catalog::SourceFragment;
use trilogy_studio_ir::{ColumnBinding, Concept, DataType, Datasource, Expr, Purpose};
use trilogy_studio_semantic::{Environment, parse_text};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::profiling::StageTimings;

/// One display token of a flattened lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageItem {
    pub token: String,
    pub depth: usize,
}

impl LineageItem {
    fn new(token: impl Into<String>, depth: usize) -> Self {
        Self {
            token: token.into(),
            depth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConcept {
    pub name: String,
    pub address: String,
    pub namespace: String,
    pub datatype: DataType,
    pub purpose: Purpose,
    pub description: Option<String>,
    pub keys: Vec<String>,
    pub lineage: Vec<LineageItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDatasource {
    pub name: String,
    /// Physical table address
    pub address: String,
    pub columns: Vec<ColumnBinding>,
    pub grain: Vec<String>,
}

impl From<&Datasource> for ModelDatasource {
    fn from(datasource: &Datasource) -> Self {
        Self {
            name: datasource.name.clone(),
            address: datasource.address.clone(),
            columns: datasource.columns.clone(),
            grain: datasource.grain.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    /// Sorted by name
    pub concepts: Vec<ModelConcept>,
    pub datasources: Vec<ModelDatasource>,
}

/// Summarize the source aliased `name`
///
/// # Errors
///
/// [`EngineError::UnknownModel`] if no source has that alias, otherwise the
/// first syntax or semantic error in its text.
pub fn parse_model(name: &str, sources: &[SourceFragment], config: &EngineConfig) -> EngineResult<ModelSummary> {
    let source = sources
        .iter()
        .find(|s| s.alias == name)
        .ok_or_else(|| EngineError::UnknownModel(name.to_string()))?;

    let mut timings = StageTimings::new("parse_model", config.performance_logging);
    let mut env = timings.time("environment", || {
        Environment::from_sources(sources.iter().cloned())
    });
    timings.time("parse", || parse_text(&source.contents, &mut env))?;

    let mut concepts: Vec<ModelConcept> = env
        .concepts()
        .values()
        .filter(|c| !c.is_private())
        .map(|c| model_concept(c, &env))
        .collect();
    concepts.sort_by(|a, b| a.name.cmp(&b.name));

    let datasources = env.datasources().values().map(ModelDatasource::from).collect();

    debug!(model = name, concepts = concepts.len(), "model parsed");
    timings.finish();
    Ok(ModelSummary {
        name: name.to_string(),
        concepts,
        datasources,
    })
}

fn model_concept(concept: &Concept, env: &Environment) -> ModelConcept {
    ModelConcept {
        name: concept.name.clone(),
        address: concept.address(),
        namespace: concept.namespace.clone(),
        datatype: concept.datatype.clone(),
        purpose: concept.purpose,
        description: concept.description.clone(),
        keys: concept.keys.clone(),
        lineage: flatten_lineage(concept, env),
    }
}

/// Display tokens of a concept's lineage; empty for root concepts
pub fn flatten_lineage(concept: &Concept, env: &Environment) -> Vec<LineageItem> {
    let mut chain = Vec::new();
    if let Some(lineage) = &concept.lineage {
        let mut path = HashSet::from([concept.address()]);
        flatten_expr(lineage, 1, env, &mut path, &mut chain);
    }
    chain
}

fn flatten_expr(
    expr: &Expr,
    depth: usize,
    env: &Environment,
    path: &mut HashSet<String>,
    chain: &mut Vec<LineageItem>,
) {
    match expr {
        Expr::Function { name, args } => {
            chain.push(LineageItem::new(name.as_str(), depth));
            chain.push(LineageItem::new("(", depth));
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    chain.push(LineageItem::new(",", depth + 1));
                }
                flatten_expr(arg, depth + 1, env, path, chain);
            }
            chain.push(LineageItem::new(")", depth));
        }
        Expr::Concept(reference) => {
            chain.push(LineageItem::new(reference.to_string(), depth));
            let Some(lineage) = env.concept(&reference.address).and_then(|c| c.lineage.as_ref())
            else {
                return;
            };
            // overrides can make a concept reference itself
            if path.insert(reference.address.clone()) {
                chain.push(LineageItem::new("<-", depth));
                flatten_expr(lineage, depth + 1, env, path, chain);
                path.remove(&reference.address);
            }
        }
        Expr::BinaryOp { left, op, right } => {
            flatten_expr(left, depth, env, path, chain);
            chain.push(LineageItem::new(op.symbol(), depth));
            flatten_expr(right, depth, env, path, chain);
        }
        Expr::Paren(inner) => {
            chain.push(LineageItem::new("(", depth));
            flatten_expr(inner, depth + 1, env, path, chain);
            chain.push(LineageItem::new(")", depth));
        }
        other => chain.push(LineageItem::new(other.to_string(), depth)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilogy_studio_test_utils::ModelFixtures;

    fn tokens(items: &[LineageItem]) -> Vec<(&str, usize)> {
        items.iter().map(|i| (i.token.as_str(), i.depth)).collect()
    }

    #[test]
    fn test_summary_lists_public_concepts_sorted() {
        let summary =
            parse_model("shop", &ModelFixtures::shop_sources(), &EngineConfig::default()).unwrap();
        let names: Vec<&str> = summary.concepts.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"revenue"));
        assert!(!names.contains(&"_load_id"));
        assert_eq!(summary.datasources.len(), 2);
    }

    #[test]
    fn test_description_and_keys() {
        let summary =
            parse_model("shop", &ModelFixtures::shop_sources(), &EngineConfig::default()).unwrap();
        let amount = summary.concepts.iter().find(|c| c.name == "amount").unwrap();
        assert_eq!(amount.description.as_deref(), Some("order value in dollars"));
        assert_eq!(amount.keys, vec!["local.order_id".to_string()]);
        assert!(amount.lineage.is_empty());
    }

    #[test]
    fn test_function_lineage_tokens() {
        let summary =
            parse_model("shop", &ModelFixtures::shop_sources(), &EngineConfig::default()).unwrap();
        let revenue = summary.concepts.iter().find(|c| c.name == "revenue").unwrap();
        assert_eq!(
            tokens(&revenue.lineage),
            vec![("sum", 1), ("(", 1), ("amount", 2), (")", 1)]
        );
    }

    #[test]
    fn test_derived_reference_is_expanded() {
        let sources = vec![SourceFragment::new(
            "m",
            "key x int;\nmetric total <- count(x);\nmetric doubled <- total * 2;",
        )];
        let summary = parse_model("m", &sources, &EngineConfig::default()).unwrap();
        let doubled = summary.concepts.iter().find(|c| c.name == "doubled").unwrap();
        assert_eq!(
            tokens(&doubled.lineage),
            vec![
                ("total", 1),
                ("<-", 1),
                ("count", 2),
                ("(", 2),
                ("x", 3),
                (")", 2),
                ("*", 1),
                ("2", 1),
            ]
        );
    }

    #[test]
    fn test_unknown_model() {
        let err = parse_model("nope", &ModelFixtures::shop_sources(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownModel(ref name) if name == "nope"));
    }
}
