//! Folded phase/sub-integration profiles.

use serde::Serialize;

/// Result of optimising one folded profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldOutcome {
    /// Best folded signal-to-noise found by the optimiser.
    pub snr: f32,
    /// Refined period in seconds.
    pub period: f64,
    /// Optimal pulse width in bins.
    pub width: usize,
    /// Phase bin of the pulse centre.
    pub bin: usize,
}

/// An `nbins x nints` fold matrix.
///
/// Row `k` is the phase profile accumulated over the `k`-th slice of the
/// observation; summing the rows gives the integrated pulse profile. The
/// fold period and observation length are recorded alongside so the
/// optimiser can convert a phase drift back into a period correction.
#[derive(Clone, Debug)]
pub struct FoldedProfile {
    nbins: usize,
    nints: usize,
    data: Vec<f32>,
    period: f64,
    tobs: f32,
    opt: Option<FoldOutcome>,
}

impl FoldedProfile {
    /// Allocates a zeroed profile of the given shape.
    pub fn new(nbins: usize, nints: usize) -> Self {
        Self {
            nbins,
            nints,
            data: vec![0.0; nbins * nints],
            period: 0.0,
            tobs: 0.0,
            opt: None,
        }
    }

    /// Builds a profile around existing row-major data.
    ///
    /// `data` is resized to `nbins * nints`, padding with zeros if short.
    pub fn from_data(
        mut data: Vec<f32>,
        nbins: usize,
        nints: usize,
        period: f64,
        tobs: f32,
    ) -> Self {
        data.resize(nbins * nints, 0.0);
        Self {
            nbins,
            nints,
            data,
            period,
            tobs,
            opt: None,
        }
    }

    /// Phase bins per rotation.
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// Number of sub-integrations.
    pub fn nints(&self) -> usize {
        self.nints
    }

    /// Fold period in seconds.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Observation length in seconds.
    pub fn tobs(&self) -> f32 {
        self.tobs
    }

    /// Outcome of the last optimisation pass, if any.
    pub fn opt(&self) -> Option<FoldOutcome> {
        self.opt
    }

    /// Row-major profile data, `nints` rows of `nbins`.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Phase profile of sub-integration `k`.
    pub fn subint(&self, k: usize) -> Option<&[f32]> {
        let start = k.checked_mul(self.nbins)?;
        let end = start.checked_add(self.nbins)?;
        self.data.get(start..end)
    }

    /// Sums the sub-integrations into a single phase profile.
    pub fn integrated(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.nbins];
        if self.nbins == 0 {
            return out;
        }
        for row in self.data.chunks_exact(self.nbins) {
            for (acc, v) in out.iter_mut().zip(row) {
                *acc += v;
            }
        }
        out
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub(crate) fn set_fold(&mut self, period: f64, tobs: f32) {
        self.period = period;
        self.tobs = tobs;
    }

    pub(crate) fn set_opt(&mut self, outcome: FoldOutcome) {
        self.opt = Some(outcome);
    }
}
