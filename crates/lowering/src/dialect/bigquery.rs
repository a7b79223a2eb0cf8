// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! BigQuery SQL generation

use trilogy_studio_ir::{DataType, Dialect};

use super::base::SqlDialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct BigQueryDialect;

impl SqlDialect for BigQueryDialect {
    fn dialect(&self) -> Dialect {
        Dialect::BigQuery
    }

    fn quote(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "\\`"))
    }

    fn type_name(&self, datatype: &DataType) -> String {
        match datatype.base() {
            DataType::String => "STRING",
            DataType::Integer => "INT64",
            DataType::Float => "FLOAT64",
            DataType::Numeric => "NUMERIC",
            DataType::Boolean => "BOOL",
            DataType::Date => "DATE",
            DataType::Datetime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            _ => "STRING",
        }
        .to_string()
    }

    /// Project-qualified addresses are quoted as a whole
    fn quote_table(&self, address: &str) -> String {
        if address.split('.').any(super::base::needs_quoting) {
            self.quote(address)
        } else {
            address.to_string()
        }
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    fn modulo(&self, left: &str, right: &str) -> String {
        format!("MOD({}, {})", left, right)
    }

    fn function(&self, name: &str, args: &[String]) -> String {
        match name {
            "current_datetime" => "CURRENT_DATETIME()".to_string(),
            "current_date" => "CURRENT_DATE()".to_string(),
            "count_distinct" => format!("COUNT(DISTINCT {})", args.join(", ")),
            "date" => format!("DATE({})", args.join(", ")),
            "year" | "month" | "day" => format!(
                "EXTRACT({} FROM {})",
                name.to_ascii_uppercase(),
                args.join(", ")
            ),
            _ => format!("{}({})", name.to_ascii_uppercase(), args.join(", ")),
        }
    }
}
