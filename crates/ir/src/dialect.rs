// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module defines the SQL dialects queries can be compiled for and the
//! syntax features that vary across them.
//!
//! ## Dialects
//!
//! - **BigQuery**: backtick identifiers, `CREATE OR REPLACE TABLE`
//! - **DuckDB**: double-quoted identifiers, `LIMIT n`
//! - **Postgres**: double-quoted identifiers, `LIMIT n`, no `CREATE OR REPLACE TABLE`
//! - **Snowflake**: double-quoted identifiers, `QUALIFY`
//! - **SQL Server**: bracketed identifiers, `SELECT TOP n`
//!
//! ## Dialect Features
//!
//! - `LimitClause`: trailing `LIMIT n`
//! - `TopClause`: leading `SELECT TOP n`
//! - `FullOuterJoin`: FULL OUTER JOIN support
//! - `CreateOrReplace`: `CREATE OR REPLACE TABLE ... AS`
//! - `Qualify`: `QUALIFY` clause over window functions
//! - `Cte`: Common Table Expressions (WITH clauses)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    #[serde(rename = "bigquery")]
    BigQuery,
    #[serde(rename = "duck_db")]
    DuckDB,
    #[serde(rename = "postgres")]
    Postgres,
    #[serde(rename = "snowflake")]
    Snowflake,
    #[serde(rename = "sql_server")]
    SqlServer,
}

impl Dialect {
    /// All dialects, in a stable order
    pub const ALL: [Dialect; 5] = [
        Dialect::BigQuery,
        Dialect::DuckDB,
        Dialect::Postgres,
        Dialect::Snowflake,
        Dialect::SqlServer,
    ];

    /// Wire name, as used in requests and config files
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::BigQuery => "bigquery",
            Dialect::DuckDB => "duck_db",
            Dialect::Postgres => "postgres",
            Dialect::Snowflake => "snowflake",
            Dialect::SqlServer => "sql_server",
        }
    }

    /// Check if this dialect supports a specific feature
    pub fn supports(&self, feature: DialectFeature) -> bool {
        match feature {
            DialectFeature::Cte | DialectFeature::FullOuterJoin => true,
            DialectFeature::LimitClause => !matches!(self, Dialect::SqlServer),
            DialectFeature::TopClause => matches!(self, Dialect::SqlServer),
            DialectFeature::CreateOrReplace => matches!(
                self,
                Dialect::BigQuery | Dialect::DuckDB | Dialect::Snowflake
            ),
            DialectFeature::Qualify => matches!(
                self,
                Dialect::BigQuery | Dialect::DuckDB | Dialect::Snowflake
            ),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "bigquery" | "big_query" => Ok(Dialect::BigQuery),
            "duck_db" | "duckdb" => Ok(Dialect::DuckDB),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "snowflake" => Ok(Dialect::Snowflake),
            "sql_server" | "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            other => Err(format!("unsupported dialect '{}'", other)),
        }
    }
}

/// Dialect-specific syntax features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DialectFeature {
    /// Trailing `LIMIT n`
    LimitClause,

    /// Leading `SELECT TOP n` (SQL Server)
    TopClause,

    /// FULL OUTER JOIN
    FullOuterJoin,

    /// `CREATE OR REPLACE TABLE`
    CreateOrReplace,

    /// `QUALIFY` clause
    Qualify,

    /// CTE (Common Table Expression) - WITH clauses
    Cte,
}
