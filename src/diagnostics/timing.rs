//! Stopwatch for the stages of a solve.
//!
//! A solve records `input`, `detrend`, `relax` and `output` laps, where
//! `relax` covers every level of the spacing cascade. Planar input never
//! reaches `relax`.
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One lap: a stage label and the milliseconds it took.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Laps in the order they were taken, plus the wall time of the whole solve.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Record the time since `start` under `label`.
    pub fn lap(&mut self, label: impl Into<String>, start: Instant) {
        self.push(label, elapsed_ms(start));
    }

    /// Sum of all entries carrying `label`.
    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        let mut found = None;
        for stage in self.stages.iter().filter(|s| s.label == label) {
            *found.get_or_insert(0.0) += stage.elapsed_ms;
        }
        found
    }
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
