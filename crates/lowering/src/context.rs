// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Lowering context for tracking state during planning

use crate::error::LoweringError;
use trilogy_studio_ir::Dialect;

/// Lineage deeper than this is treated as a cycle
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Context for tracking state while planning one statement
///
/// The context maintains:
/// - Accumulated errors, for passes that keep going after a failure
/// - Recursion depth of lineage expansion
/// - Dialect information
#[derive(Debug)]
pub struct LoweringContext {
    dialect: Dialect,

    errors: Vec<LoweringError>,

    recursion_depth: usize,

    max_recursion_depth: usize,
}

impl LoweringContext {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_max_depth(dialect, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(dialect: Dialect, max_depth: usize) -> Self {
        Self {
            dialect,
            errors: Vec::new(),
            recursion_depth: 0,
            max_recursion_depth: max_depth,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Record an error without aborting the pass
    pub fn add_error(&mut self, error: LoweringError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[LoweringError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take the accumulated errors, leaving the context empty
    pub fn take_errors(&mut self) -> Vec<LoweringError> {
        std::mem::take(&mut self.errors)
    }

    /// Increment recursion depth and check for overflow
    pub fn enter_recursive_context(&mut self, context: &str) -> Result<(), LoweringError> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.max_recursion_depth {
            Err(LoweringError::RecursionLimitExceeded {
                context: context.to_string(),
                depth: self.recursion_depth,
                limit: self.max_recursion_depth,
            })
        } else {
            Ok(())
        }
    }

    /// Decrement recursion depth when exiting a recursive context
    pub fn exit_recursive_context(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }
}
