// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Dialect-specific SQL generation

pub mod base;

pub mod bigquery;
pub mod duckdb;
pub mod postgres;
pub mod snowflake;
pub mod sqlserver;

pub use base::{PersistStyle, SqlDialect};
pub use bigquery::BigQueryDialect;
pub use duckdb::DuckDbDialect;
pub use postgres::PostgresDialect;
pub use snowflake::SnowflakeDialect;
pub use sqlserver::SqlServerDialect;

use trilogy_studio_ir::Dialect;

/// The generator for a dialect
pub fn for_dialect(dialect: Dialect) -> Box<dyn SqlDialect> {
    match dialect {
        Dialect::BigQuery => Box::new(BigQueryDialect),
        Dialect::DuckDB => Box::new(DuckDbDialect),
        Dialect::Postgres => Box::new(PostgresDialect),
        Dialect::Snowflake => Box::new(SnowflakeDialect),
        Dialect::SqlServer => Box::new(SqlServerDialect),
    }
}
