// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Trilogy Studio - Intermediate Representation
//!
//! This crate provides the typed representation shared by every layer of the
//! query compiler. The IR is designed to:
//! - Describe concepts (named, typed, possibly computed fields) and datasources
//! - Represent parsed statements as a closed set of statement kinds
//! - Stay dialect-agnostic; SQL dialects only appear at lowering time
//!
//! ## Layering
//!
//! ```text
//! grammar (syntax) → semantic (Environment + Statement) → lowering (SQL)
//!                         ↑
//!                        ir
//! ```

pub mod concept;
pub mod datasource;
pub mod datatype;
pub mod dialect;
pub mod expr;
pub mod statement;

// Re-export commonly used types
pub use concept::{Concept, DEFAULT_NAMESPACE, PRIVATE_PREFIX, address_of, split_address};
pub use datasource::{ColumnBinding, Datasource};
pub use datatype::{DataType, DataTypeError, Purpose};
pub use dialect::{Dialect, DialectFeature};
pub use expr::{BinaryOp, ConceptRef, Expr, Literal, UnaryOp};
pub use statement::{
    AlignItem, ConceptDeclaration, DatasourceDeclaration, HavingClause, ImportStatement,
    MultiSelectStatement, OrderItem, PersistStatement, RawSqlStatement, SelectStatement,
    ShowStatement, ShowTarget, SortDirection, Statement, StatementKind, TypeDeclaration,
    ValidateStatement, WhereClause,
};
