// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL-specific test helpers and custom assertions

/// Custom assertion helpers for generated SQL
pub struct SqlAssertions;

impl SqlAssertions {
    /// Collapse all whitespace runs to single spaces
    pub fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Assert that `sql` contains `fragment`, ignoring whitespace differences
    pub fn assert_contains(sql: &str, fragment: &str) {
        let normalized = Self::normalize(sql);
        let fragment = Self::normalize(fragment);
        assert!(
            normalized.contains(&fragment),
            "Expected SQL to contain '{}', got:\n{}",
            fragment,
            sql
        );
    }

    /// Assert that `sql` does not contain `fragment`, ignoring whitespace
    pub fn assert_not_contains(sql: &str, fragment: &str) {
        let normalized = Self::normalize(sql);
        let fragment = Self::normalize(fragment);
        assert!(
            !normalized.contains(&fragment),
            "Expected SQL not to contain '{}', got:\n{}",
            fragment,
            sql
        );
    }

    /// Assert that `sql` ends with a `LIMIT n` clause
    pub fn assert_limit(sql: &str, limit: u64) {
        let normalized = Self::normalize(sql);
        let expected = format!("LIMIT {}", limit);
        assert!(
            normalized.trim_end_matches(';').trim_end().ends_with(&expected),
            "Expected SQL to end with '{}', got:\n{}",
            expected,
            sql
        );
    }
}
