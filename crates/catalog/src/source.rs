// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

/// A named chunk of model text that other text may import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFragment {
    /// Module name the fragment is imported by
    pub alias: String,
    #[serde(alias = "text")]
    pub contents: String,
}

impl SourceFragment {
    pub fn new(alias: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            contents: contents.into(),
        }
    }
}

/// Request-level instruction to import a module, optionally under an alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDirective {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ImportDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Whether `name` is a dotted identifier path (`game.team`)
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_accepts_text_field() {
        let fragment: SourceFragment =
            serde_json::from_str(r#"{"alias": "orders", "text": "key id int;"}"#).unwrap();
        assert_eq!(fragment.contents, "key id int;");
    }

    #[test]
    fn test_import_alias_defaults_to_none() {
        let directive: ImportDirective = serde_json::from_str(r#"{"name": "orders"}"#).unwrap();
        assert_eq!(directive, ImportDirective::new("orders"));
    }

    #[test]
    fn test_module_names() {
        assert!(is_valid_module_name("game.team"));
        assert!(is_valid_module_name("_private"));
        assert!(!is_valid_module_name("game..team"));
        assert!(!is_valid_module_name("1abc"));
        assert!(!is_valid_module_name(""));
    }
}
