// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DuckDB SQL generation

use trilogy_studio_ir::{DataType, Dialect};

use super::base::SqlDialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl SqlDialect for DuckDbDialect {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDB
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn type_name(&self, datatype: &DataType) -> String {
        match datatype.base() {
            DataType::String => "VARCHAR",
            DataType::Integer => "BIGINT",
            DataType::Float => "DOUBLE",
            DataType::Numeric => "DECIMAL",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Datetime => "TIMESTAMP",
            DataType::Timestamp => "TIMESTAMPTZ",
            _ => "VARCHAR",
        }
        .to_string()
    }
}
