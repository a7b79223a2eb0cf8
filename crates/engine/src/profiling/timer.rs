// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scoped timing
//!
//! # Example
//!
//! ```rust
//! use trilogy_studio_engine::profiling::ScopedTimer;
//!
//! {
//!     let _timer = ScopedTimer::new("format_query", true);
//!     // ... do work ...
//! } // elapsed time is logged when the timer drops
//! ```

use std::time::{Duration, Instant};

use tracing::debug;

use super::PERFORMANCE_TARGET;

/// Logs the elapsed time of a scope when dropped
///
/// A disabled timer still measures but never logs.
#[derive(Debug)]
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    enabled: bool,
}

impl ScopedTimer {
    pub fn new(name: &'static str, enabled: bool) -> Self {
        Self {
            name,
            start: Instant::now(),
            enabled,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if self.enabled {
            debug!(
                target: PERFORMANCE_TARGET,
                scope = self.name,
                elapsed_us = self.start.elapsed().as_micros() as u64,
                "scope finished"
            );
        }
    }
}

/// Macro for creating scoped timers with ergonomic syntax
///
/// # Example
///
/// ```rust
/// use trilogy_studio_engine::timed_scope;
///
/// fn work(enabled: bool) {
///     timed_scope!("work", enabled);
///     // ... code ...
/// }
/// work(false);
/// ```
#[macro_export]
macro_rules! timed_scope {
    ($name:expr, $enabled:expr) => {
        let _timer = $crate::profiling::ScopedTimer::new($name, $enabled);
    };
}
