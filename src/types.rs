//! Core candidate type shared by the search front end and the refiner.

use serde::Serialize;

/// One periodicity candidate, as produced by an upstream search and
/// annotated in place by [`crate::refiner::CandidateRefiner`].
///
/// The detection fields (`freq`, `acc`, `dm_idx`, `dm`, `snr`) come from the
/// search; the `Option` fields start out empty and are filled by the folding
/// pass.
#[derive(Clone, Debug, Serialize)]
pub struct Candidate {
    /// Spin frequency in Hz.
    pub freq: f64,
    /// Line-of-sight acceleration in m/s^2.
    pub acc: f32,
    /// Index of the dispersion trial the candidate was found in.
    pub dm_idx: usize,
    /// Dispersion measure of that trial, pc/cm^3.
    pub dm: f32,
    /// Detection signal-to-noise from the periodicity search.
    pub snr: f32,
    /// Signal-to-noise of the optimised folded profile.
    pub folded_snr: Option<f32>,
    /// Refined period in seconds.
    pub opt_period: Option<f64>,
    /// Optimal pulse width in profile bins.
    pub opt_width: Option<usize>,
    /// Phase bin of the pulse centre in the optimised profile.
    pub opt_bin: Option<usize>,
}

impl Candidate {
    /// Creates an unrefined candidate from detection parameters.
    pub fn new(freq: f64, acc: f32, dm_idx: usize, dm: f32, snr: f32) -> Self {
        Self {
            freq,
            acc,
            dm_idx,
            dm,
            snr,
            folded_snr: None,
            opt_period: None,
            opt_width: None,
            opt_bin: None,
        }
    }

    /// Barycentric spin period in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.freq
    }

    /// Ranking key: the better of the detection and folded S/N.
    ///
    /// Candidates that were never folded rank on their detection S/N alone.
    pub fn ranking_snr(&self) -> f32 {
        match self.folded_snr {
            Some(folded) => self.snr.max(folded),
            None => self.snr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_inverts_frequency() {
        let cand = Candidate::new(8.0, 0.0, 0, 0.0, 10.0);
        assert!((cand.period() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn ranking_prefers_better_snr() {
        let mut cand = Candidate::new(8.0, 0.0, 0, 0.0, 10.0);
        assert_eq!(cand.ranking_snr(), 10.0);
        cand.folded_snr = Some(12.5);
        assert_eq!(cand.ranking_snr(), 12.5);
        cand.folded_snr = Some(4.0);
        assert_eq!(cand.ranking_snr(), 10.0);
    }
}
