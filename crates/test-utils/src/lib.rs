// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for Trilogy Studio
//!
//! This crate provides common testing components including:
//! - Model fixtures shared by the semantic, lowering and engine tests
//! - A mock import resolver that records which modules were requested
//! - SQL-specific assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_resolver;

// Re-exports for convenience
pub use assertions::SqlAssertions;
pub use fixtures::ModelFixtures;
pub use mock_resolver::{MockResolver, MockResolverBuilder};
