// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Per-operation stage timings
//!
//! A [`StageTimings`] collects the duration of each named stage of one
//! operation (environment setup, imports, parse, ...) and logs a single
//! summary line with each stage's share of the total.

use std::time::{Duration, Instant};

use tracing::info;

use super::PERFORMANCE_TARGET;

/// Share of `total` taken by `part`, in percent; zero when `total` is zero
pub fn safe_percentage(part: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        0.0
    } else {
        part.as_secs_f64() / total.as_secs_f64() * 100.0
    }
}

/// Named stage durations of one operation
#[derive(Debug)]
pub struct StageTimings {
    operation: &'static str,
    enabled: bool,
    start: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl StageTimings {
    pub fn new(operation: &'static str, enabled: bool) -> Self {
        Self {
            operation,
            enabled,
            start: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Run `f`, recording its duration under `stage`
    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    /// Add `duration` to `stage`, creating it on first use
    pub fn record(&mut self, stage: &'static str, duration: Duration) {
        match self.stages.iter_mut().find(|(name, _)| *name == stage) {
            Some((_, total)) => *total += duration,
            None => self.stages.push((stage, duration)),
        }
    }

    pub fn stage(&self, stage: &str) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, d)| *d)
    }

    pub fn total(&self) -> Duration {
        self.start.elapsed()
    }

    /// `Total: 1.2ms | parse: 0.4ms (33.3%) | ...`
    pub fn summary(&self) -> String {
        let total = self.total();
        let mut parts = vec![format!("Total: {:.2?}", total)];
        for (name, duration) in &self.stages {
            parts.push(format!(
                "{}: {:.2?} ({:.1}%)",
                name,
                duration,
                safe_percentage(*duration, total)
            ));
        }
        parts.join(" | ")
    }

    /// Log the summary if enabled
    pub fn finish(self) {
        if self.enabled {
            info!(
                target: PERFORMANCE_TARGET,
                operation = self.operation,
                "{}",
                self.summary()
            );
        }
    }
}
