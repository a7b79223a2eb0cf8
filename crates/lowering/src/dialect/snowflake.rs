// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Snowflake SQL generation

use trilogy_studio_ir::{DataType, Dialect};

use super::base::SqlDialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeDialect;

impl SqlDialect for SnowflakeDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Snowflake
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn type_name(&self, datatype: &DataType) -> String {
        match datatype.base() {
            DataType::String => "VARCHAR",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Numeric => "NUMBER",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Datetime => "TIMESTAMP_NTZ",
            DataType::Timestamp => "TIMESTAMP_TZ",
            _ => "VARCHAR",
        }
        .to_string()
    }

    fn function(&self, name: &str, args: &[String]) -> String {
        match name {
            "count_distinct" => format!("COUNT(DISTINCT {})", args.join(", ")),
            "current_datetime" => "CURRENT_TIMESTAMP()".to_string(),
            "current_date" => "CURRENT_DATE()".to_string(),
            "date" => format!("TO_DATE({})", args.join(", ")),
            "year" | "month" | "day" => {
                format!("{}({})", name.to_ascii_uppercase(), args.join(", "))
            }
            _ => format!("{}({})", name.to_ascii_uppercase(), args.join(", ")),
        }
    }
}
