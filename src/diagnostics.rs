//! Structured reports describing a refinement pass.
//!
//! Everything here serializes to JSON so runs can be archived and compared.

use std::time::Instant;

use serde::Serialize;

/// Wall-clock time spent in one named stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Per-stage timing summary of a refinement pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Records the time elapsed since `start` under `label`.
    pub fn record(&mut self, label: &str, start: Instant) {
        self.push(label, start.elapsed().as_secs_f64() * 1000.0);
    }

    /// Records an already measured duration under `label`.
    pub fn push(&mut self, label: &str, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.to_string(),
            elapsed_ms,
        });
    }
}

/// What happened while processing one dispersion trial.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialTrace {
    /// Index of the trial in the input block.
    pub dm_idx: usize,
    /// Dispersion measure of the trial, pc/cm^3.
    pub dm: f32,
    /// Candidates folded against this trial.
    pub candidates: usize,
    /// Time spent whitening the trial, milliseconds.
    pub clean_ms: f64,
    /// Time spent folding and optimising its candidates, milliseconds.
    pub fold_ms: f64,
}

/// Summary of one refinement pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineReport {
    /// Candidates considered, after the ranking cutoff.
    pub selected: usize,
    /// Candidates whose period fell inside the folding window.
    pub eligible: usize,
    /// Candidates successfully folded and optimised.
    pub refined: usize,
    /// Candidates skipped after a per-candidate failure.
    pub failed: usize,
    /// Distinct dispersion trials that were processed.
    pub groups: usize,
    pub timings: TimingBreakdown,
    pub trials: Vec<TrialTrace>,
}
