// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL Server SQL generation
//!
//! Differences from the other dialects: bracketed identifiers, `SELECT TOP n`
//! instead of `LIMIT`, `1`/`0` for booleans and `SELECT ... INTO` for
//! persisted tables.

use trilogy_studio_ir::{DataType, Dialect};

use super::base::{PersistStyle, SqlDialect};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn quote(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn type_name(&self, datatype: &DataType) -> String {
        match datatype.base() {
            DataType::String => "NVARCHAR(MAX)",
            DataType::Integer => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Numeric => "DECIMAL(38, 9)",
            DataType::Boolean => "BIT",
            DataType::Date => "DATE",
            DataType::Datetime => "DATETIME2",
            DataType::Timestamp => "DATETIMEOFFSET",
            _ => "NVARCHAR(MAX)",
        }
        .to_string()
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    fn function(&self, name: &str, args: &[String]) -> String {
        match name {
            "count_distinct" => format!("COUNT(DISTINCT {})", args.join(", ")),
            "current_date" => "CAST(GETDATE() AS DATE)".to_string(),
            "current_datetime" => "GETDATE()".to_string(),
            "date" => format!("CAST({} AS DATE)", args.join(", ")),
            "length" => format!("LEN({})", args.join(", ")),
            "ceil" => format!("CEILING({})", args.join(", ")),
            _ => format!("{}({})", name.to_ascii_uppercase(), args.join(", ")),
        }
    }

    fn persist_style(&self) -> PersistStyle {
        PersistStyle::SelectInto
    }
}
