//! JSON configuration for the demo binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::refiner::RefineParams;

/// Synthetic observation used when no real data is wired in.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Samples per dispersion trial.
    pub nsamps: usize,
    /// Sampling interval in seconds.
    pub tsamp: f64,
    /// Number of dispersion trials to synthesise.
    pub ntrials: usize,
    /// Spin frequency of the injected pulsar, Hz.
    pub freq: f64,
    /// Pulse duty cycle as a fraction of the period.
    pub duty_cycle: f64,
    /// Pulse amplitude in units of the noise standard deviation.
    pub amplitude: f32,
    /// Seed for the noise generator.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            nsamps: 1 << 16,
            tsamp: 256e-6,
            ntrials: 4,
            freq: 7.8125,
            duty_cycle: 0.05,
            amplitude: 0.3,
            seed: 17,
        }
    }
}

/// Full configuration of a demo run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub scene: SceneConfig,
    pub refine: RefineParams,
    /// Where to write the JSON refinement report, if anywhere.
    pub report_json: Option<PathBuf>,
}

/// Loads a [`RunConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse config {}: {e}", path.display()))
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize {}: {e}", path.display()))?;
    fs::write(path, text).map_err(|e| format!("failed to write {}: {e}", path.display()))
}
