// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Performance logging
//!
//! Timings are emitted on the [`PERFORMANCE_TARGET`] tracing target so they
//! can be enabled independently, e.g.
//! `RUST_LOG=trilogy_studio::performance=info`. Nothing is logged unless
//! `performance_logging` is set in the engine configuration.

mod stats;
mod timer;

pub use stats::{StageTimings, safe_percentage};
pub use timer::ScopedTimer;

/// Tracing target for timing output
pub const PERFORMANCE_TARGET: &str = "trilogy_studio::performance";
