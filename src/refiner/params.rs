//! Tunable parameters for candidate refinement.

use serde::{Deserialize, Serialize};

/// Parameters controlling folding, optimisation and candidate selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Phase bins per folded profile.
    pub nbins: usize,
    /// Sub-integrations per folded profile.
    pub nints: usize,
    /// Template width step in bins. Step 1 tries every width up to a full
    /// rotation; larger steps trade width resolution for speed.
    pub template_step: usize,
    /// Shortest period eligible for folding, seconds (exclusive).
    pub min_period: f64,
    /// Longest period eligible for folding, seconds (exclusive).
    pub max_period: f64,
    /// Minimum FFT batch size before the parallel path engages.
    pub parallel_min_rows: usize,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            nbins: 64,
            nints: 16,
            template_step: 1,
            min_period: 1e-3,
            max_period: 10.0,
            parallel_min_rows: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let params: RefineParams = serde_json::from_str(r#"{"nbins": 128}"#).unwrap();
        assert_eq!(params.nbins, 128);
        assert_eq!(params.nints, 16);
        assert_eq!(params.template_step, 1);
        assert!((params.max_period - 10.0).abs() < 1e-12);
    }
}
