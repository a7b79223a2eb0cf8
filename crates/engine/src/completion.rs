// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion rendering
//!
//! Converts Environment concepts into completion items. Rendering is
//! incremental: a `seen` set of addresses lets the diagnostic engine render
//! once before and once after the text's own declarations are applied
//! without emitting any concept twice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use trilogy_studio_ir::Concept;
use trilogy_studio_semantic::Environment;

/// Editor completion for one concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    /// Bare name in the default namespace, full address otherwise
    pub label: String,
    pub datatype: String,
    pub description: Option<String>,
    /// Canonical text of the concept's lineage
    pub calculation_text: Option<String>,
    /// Key addresses of a property
    pub keys: Vec<String>,
}

/// Completion renderer
pub struct CompletionRenderer;

impl CompletionRenderer {
    /// Render every non-private concept whose address is not in `seen`
    ///
    /// Rendered addresses are added to `seen`.
    pub fn render_new(env: &Environment, seen: &mut HashSet<String>) -> Vec<CompletionItem> {
        env.concepts()
            .iter()
            .filter(|(_, concept)| !concept.is_private())
            .filter(|(address, _)| seen.insert((*address).clone()))
            .map(|(_, concept)| Self::concept_item(concept))
            .collect()
    }

    pub fn concept_item(concept: &Concept) -> CompletionItem {
        CompletionItem {
            label: concept.display_name(),
            datatype: concept.datatype.to_string(),
            description: concept.description.clone(),
            calculation_text: concept.lineage.as_ref().map(|l| l.to_string()),
            keys: concept.keys.clone(),
        }
    }
}
