// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Request and response types
//!
//! Every type here is (de)serializable with serde; the CLI reads requests
//! and writes responses as JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trilogy_studio_catalog::{ImportDirective, SourceFragment};
use trilogy_studio_ir::{Concept, DataType, Dialect, Purpose};
use trilogy_studio_lowering::ProcessedShow;

/// Parameter values keyed by their sigil-prefixed name (`:threshold`)
pub type Parameters = IndexMap<String, ParameterValue>;

/// A user-supplied parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

/// One independently submitted piece of query text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryFragment {
    #[serde(alias = "query")]
    pub text: String,
    /// Identifies the fragment in the output only
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub extra_filters: Vec<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl QueryFragment {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.extra_filters.push(filter.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// A batch of fragments compiled against one shared Environment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
    #[serde(default)]
    pub imports: Vec<ImportDirective>,
    /// Falls back to the configured default dialect
    #[serde(default)]
    pub dialect: Option<Dialect>,
    pub queries: Vec<QueryFragment>,
    /// Applied to every fragment
    #[serde(default)]
    pub extra_filters: Vec<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl BatchRequest {
    pub fn new(sources: Vec<SourceFragment>) -> Self {
        Self {
            sources,
            ..Default::default()
        }
    }

    pub fn with_import(mut self, import: ImportDirective) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_query(mut self, query: QueryFragment) -> Self {
        self.queries.push(query);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.extra_filters.push(filter.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// One fragment compiled on its own
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
    #[serde(default)]
    pub imports: Vec<ImportDirective>,
    #[serde(default)]
    pub dialect: Option<Dialect>,
    #[serde(flatten)]
    pub query: QueryFragment,
}

/// Text to check in the editor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosticsRequest {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatRequest {
    pub query: String,
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
}

/// A query checked with its imports and filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub query: String,
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
    #[serde(default)]
    pub imports: Vec<ImportDirective>,
    #[serde(default)]
    pub extra_filters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Alias of the source to summarize
    pub name: String,
    #[serde(default)]
    pub sources: Vec<SourceFragment>,
}

/// Metadata of one output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Bare name in the default namespace, full address otherwise
    pub name: String,
    pub datatype: DataType,
    pub purpose: Purpose,
    pub traits: Vec<String>,
    pub description: Option<String>,
}

impl From<&Concept> for OutputColumn {
    fn from(concept: &Concept) -> Self {
        Self {
            name: concept.display_name(),
            datatype: concept.datatype.clone(),
            purpose: concept.purpose,
            traits: concept.datatype.traits().to_vec(),
            description: concept.description.clone(),
        }
    }
}

/// Tabular output of an introspection statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowResults {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<ProcessedShow> for ShowResults {
    fn from(show: ProcessedShow) -> Self {
        Self {
            columns: show.columns,
            rows: show.rows,
        }
    }
}

/// Outcome of compiling one fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledResult {
    pub label: String,
    pub sql: Option<String>,
    pub output_columns: Vec<OutputColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ShowResults>,
    pub error: Option<String>,
}

impl CompiledResult {
    /// A fragment that produced no statement
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: None,
            output_columns: Vec::new(),
            results: None,
            error: None,
        }
    }

    pub fn failed(label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(label)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
