// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! Policy knobs for the diagnostic engine and the batch compiler.
//!
//! ## Configuration Structure
//!
//! - Default row limit applied to selections without `LIMIT`
//! - Truncation retry cap for the diagnostic engine
//! - Whether locally derived concepts are cleaned up after each fragment
//! - How the shared Environment recovers after a failed fragment
//! - Performance logging and the default dialect
//!
//! ## Example
//!
//! ```rust
//! use trilogy_studio_engine::{EngineConfig, FailureRecovery};
//!
//! let config = EngineConfig::from_yaml_str("default_limit: 500\nfailure_recovery: rebuild\n").unwrap();
//! assert_eq!(config.default_limit, 500);
//! assert_eq!(config.max_truncation_retries, 20);
//! assert_eq!(config.failure_recovery, FailureRecovery::Rebuild);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use trilogy_studio_ir::Dialect;

/// Row limit imposed on selections that do not set one
pub const DEFAULT_LIMIT: u64 = 10_000;

/// Parse attempts made by the diagnostic engine before giving up
pub const DEFAULT_MAX_TRUNCATION_RETRIES: usize = 20;

/// What happens to the shared Environment after a fragment fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureRecovery {
    /// Restore the snapshot taken before the fragment ran
    #[default]
    Rollback,
    /// Rebuild the Environment from the request's sources and imports
    Rebuild,
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_limit: u64,

    pub max_truncation_retries: usize,

    /// Remove each fragment's locally derived concepts once it compiles
    pub cleanup_local_concepts: bool,

    pub failure_recovery: FailureRecovery,

    /// Log stage timings on the `trilogy_studio::performance` target
    pub performance_logging: bool,

    /// Dialect used when a request does not name one
    pub default_dialect: Dialect,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_truncation_retries: DEFAULT_MAX_TRUNCATION_RETRIES,
            cleanup_local_concepts: true,
            failure_recovery: FailureRecovery::default(),
            performance_logging: false,
            default_dialect: Dialect::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_failure_recovery(mut self, recovery: FailureRecovery) -> Self {
        self.failure_recovery = recovery;
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup_local_concepts = cleanup;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.performance_logging = enabled;
        self
    }

    /// Validate the configuration
    ///
    /// Checks that the row limit and the retry cap are both non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "default_limit",
                reason: "must be > 0".to_string(),
            });
        }
        if self.max_truncation_retries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_truncation_retries",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a YAML document; missing fields take their defaults
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML (or JSON, which YAML accepts) configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}
