// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Datatypes and purposes
//!
//! Every concept carries a [`DataType`] and a [`Purpose`]. Datatypes may be
//! decorated with user-declared traits (`float::money`), which are surfaced to
//! callers as column traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Concept datatypes (unified across dialects)
///
/// Serialized as its display string (`"int"`, `"float::money"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DataType {
    String,
    Integer,
    Float,
    Numeric,
    Boolean,
    Date,
    Datetime,
    Timestamp,

    /// Type could not be inferred (e.g. `null` literal)
    Unknown,

    /// A base type decorated with one or more traits
    Trait {
        base: Box<DataType>,
        traits: Vec<String>,
    },
}

/// Errors raised while reading a datatype name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataTypeError {
    #[error("Unknown datatype '{0}'")]
    UnknownType(String),

    #[error("Empty trait name in datatype '{0}'")]
    EmptyTrait(String),
}

impl DataType {
    /// Look up a base (undecorated) type by its language name
    pub fn from_base_name(name: &str) -> Option<DataType> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "string" | "str" => DataType::String,
            "int" | "integer" | "bigint" => DataType::Integer,
            "float" | "double" => DataType::Float,
            "numeric" | "decimal" => DataType::Numeric,
            "bool" | "boolean" => DataType::Boolean,
            "date" => DataType::Date,
            "datetime" => DataType::Datetime,
            "timestamp" => DataType::Timestamp,
            _ => return None,
        };
        Some(ty)
    }

    /// Decorate this type with a trait
    pub fn with_trait(self, name: impl Into<String>) -> DataType {
        let name = name.into();
        match self {
            DataType::Trait { base, mut traits } => {
                if !traits.contains(&name) {
                    traits.push(name);
                }
                DataType::Trait { base, traits }
            }
            other => DataType::Trait {
                base: Box::new(other),
                traits: vec![name],
            },
        }
    }

    /// The undecorated base type
    pub fn base(&self) -> &DataType {
        match self {
            DataType::Trait { base, .. } => base.base(),
            other => other,
        }
    }

    /// Traits attached to this type (empty for plain types)
    pub fn traits(&self) -> &[String] {
        match self {
            DataType::Trait { traits, .. } => traits,
            _ => &[],
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.base(),
            DataType::Integer | DataType::Float | DataType::Numeric
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self.base(),
            DataType::Date | DataType::Datetime | DataType::Timestamp
        )
    }

    /// `Unknown` is compatible with everything (nulls, unresolved parts)
    pub fn is_unknown(&self) -> bool {
        matches!(self.base(), DataType::Unknown)
    }

    /// Whether values of the two types may be compared with each other
    pub fn is_comparable_with(&self, other: &DataType) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return true;
        }
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        if self.is_temporal() && other.is_temporal() {
            return true;
        }
        // temporal values are routinely compared against string literals
        if (self.is_temporal() && other.base() == &DataType::String)
            || (other.is_temporal() && self.base() == &DataType::String)
        {
            return true;
        }
        self.base() == other.base()
    }

    /// Result type of an arithmetic operation over two numeric types
    pub fn widen(&self, other: &DataType) -> DataType {
        match (self.base(), other.base()) {
            (DataType::Integer, DataType::Integer) => DataType::Integer,
            (DataType::Numeric, DataType::Numeric)
            | (DataType::Numeric, DataType::Integer)
            | (DataType::Integer, DataType::Numeric) => DataType::Numeric,
            (DataType::Unknown, other) | (other, DataType::Unknown) => other.clone(),
            _ => DataType::Float,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Integer => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Numeric => write!(f, "numeric"),
            DataType::Boolean => write!(f, "bool"),
            DataType::Date => write!(f, "date"),
            DataType::Datetime => write!(f, "datetime"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Unknown => write!(f, "unknown"),
            DataType::Trait { base, traits } => {
                write!(f, "{}", base)?;
                for t in traits {
                    write!(f, "::{}", t)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for DataType {
    type Err = DataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split("::");
        let base_name = parts.next().unwrap_or_default().trim();
        let mut ty = if base_name == "unknown" {
            DataType::Unknown
        } else {
            DataType::from_base_name(base_name)
                .ok_or_else(|| DataTypeError::UnknownType(s.to_string()))?
        };
        for trait_name in parts {
            let trait_name = trait_name.trim();
            if trait_name.is_empty() {
                return Err(DataTypeError::EmptyTrait(s.to_string()));
            }
            ty = ty.with_trait(trait_name);
        }
        Ok(ty)
    }
}

impl From<DataType> for String {
    fn from(ty: DataType) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for DataType {
    type Error = DataTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The role a concept plays in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Key,
    Property,
    Metric,
    Constant,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Purpose::Key => "key",
            Purpose::Property => "property",
            Purpose::Metric => "metric",
            Purpose::Constant => "const",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trait_type() {
        let ty: DataType = "float::money".parse().unwrap();
        assert_eq!(ty.base(), &DataType::Float);
        assert_eq!(ty.traits(), &["money".to_string()]);
        assert_eq!(ty.to_string(), "float::money");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = "varchar2".parse::<DataType>().unwrap_err();
        assert_eq!(err, DataTypeError::UnknownType("varchar2".to_string()));
    }

    #[test]
    fn test_comparability() {
        assert!(DataType::Integer.is_comparable_with(&DataType::Float));
        assert!(DataType::Date.is_comparable_with(&DataType::String));
        assert!(!DataType::String.is_comparable_with(&DataType::Integer));
        assert!(DataType::Unknown.is_comparable_with(&DataType::Boolean));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&DataType::Integer.with_trait("id")).unwrap();
        assert_eq!(json, "\"int::id\"");
    }
}
