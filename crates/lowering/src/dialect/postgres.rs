// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Postgres SQL generation

use trilogy_studio_ir::{DataType, Dialect};

use super::base::SqlDialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn type_name(&self, datatype: &DataType) -> String {
        match datatype.base() {
            DataType::String => "TEXT",
            DataType::Integer => "BIGINT",
            DataType::Float => "DOUBLE PRECISION",
            DataType::Numeric => "NUMERIC",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Datetime => "TIMESTAMP",
            DataType::Timestamp => "TIMESTAMPTZ",
            _ => "TEXT",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PersistStyle;

    #[test]
    fn test_postgres_has_no_create_or_replace_table() {
        assert_eq!(PostgresDialect.persist_style(), PersistStyle::DropAndCreate);
        assert_eq!(PostgresDialect.type_name(&DataType::Float), "DOUBLE PRECISION");
    }
}
