//! The width/shift/phase grid search.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use log::debug;

use crate::compute::{Complex32, Compute};
use crate::series::{FoldOutcome, FoldedProfile};

use super::banks::{ShiftBank, TemplateBank};
use super::snr;

/// Error from [`FoldOptimiser::optimise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimiseError {
    /// The profile shape does not match the optimiser's banks.
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// The template bank is empty for this bin count and step.
    EmptyBank { nbins: usize, step: usize },
}

impl fmt::Display for OptimiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimiseError::DimensionMismatch { expected, actual } => write!(
                f,
                "profile is {}x{} bins, optimiser expects {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            OptimiseError::EmptyBank { nbins, step } => {
                write!(f, "no templates fit {nbins} bins at width step {step}")
            }
        }
    }
}

impl Error for OptimiseError {}

/// Maps a flat index into the `[template][shift][bin]` response cube back
/// to its grid coordinates.
pub fn decompose(index: usize, nbins: usize, nshifts: usize) -> (usize, usize, usize) {
    let template = index / (nbins * nshifts);
    let rem = index % (nbins * nshifts);
    (template, rem / nbins, rem % nbins)
}

/// Searches pulse width, phase drift and phase for one profile shape.
///
/// All working buffers are sized at construction and reused across calls,
/// so a single optimiser serves every candidate folded into the same
/// `nbins x nints` grid.
pub struct FoldOptimiser {
    nbins: usize,
    nints: usize,
    templates: TemplateBank,
    shifts: ShiftBank,
    fourier: Vec<Complex32>,
    shifted: Vec<Complex32>,
    collapsed: Vec<Complex32>,
    response: Vec<Complex32>,
    power: Vec<f32>,
    winner: Vec<Complex32>,
    best_profile: Vec<f32>,
}

impl FoldOptimiser {
    /// Builds the banks and working buffers for `nbins x nints` profiles
    /// with template widths in multiples of `step` bins.
    pub fn new(compute: &dyn Compute, nbins: usize, nints: usize, step: usize) -> Self {
        let templates = TemplateBank::build(compute, nbins, step);
        let shifts = ShiftBank::build(nbins, nints);
        let nshifts = shifts.nshifts();
        let ntemplates = templates.ntemplates();
        let zero = Complex32::new(0.0, 0.0);
        Self {
            nbins,
            nints,
            templates,
            shifts,
            fourier: vec![zero; nints * nbins],
            shifted: vec![zero; nshifts * nints * nbins],
            collapsed: vec![zero; nshifts * nbins],
            response: vec![zero; ntemplates * nshifts * nbins],
            power: vec![0.0; ntemplates * nshifts * nbins],
            winner: vec![zero; nbins],
            best_profile: vec![0.0; nbins],
        }
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn nints(&self) -> usize {
        self.nints
    }

    /// Runs the grid search and records the outcome on the profile.
    ///
    /// The profile data itself is left untouched, so optimising twice gives
    /// the same answer.
    pub fn optimise(
        &mut self,
        compute: &dyn Compute,
        profile: &mut FoldedProfile,
    ) -> Result<(), OptimiseError> {
        if profile.nbins() != self.nbins || profile.nints() != self.nints {
            return Err(OptimiseError::DimensionMismatch {
                expected: (self.nbins, self.nints),
                actual: (profile.nbins(), profile.nints()),
            });
        }
        if self.templates.ntemplates() == 0 {
            return Err(OptimiseError::EmptyBank {
                nbins: self.nbins,
                step: self.templates.step(),
            });
        }
        let period = profile.period();
        let tobs = f64::from(profile.tobs());
        let start = Instant::now();

        let FoldOptimiser {
            nbins,
            nints,
            templates,
            shifts,
            fourier,
            shifted,
            collapsed,
            response,
            power,
            winner,
            best_profile,
        } = self;
        let nbins = *nbins;
        let nints = *nints;
        let nshifts = shifts.nshifts();

        // 1) Sub-integration spectra.
        compute.promote(profile.data(), fourier);
        compute.fft_forward(fourier, nbins);

        // 2) Apply every phase ramp to every sub-integration.
        compute.cycle_mul(shifts.kernels(), fourier, shifted);

        // 3) Collapse the sub-integrations of each shifted copy.
        for (s, dst) in collapsed.chunks_exact_mut(nbins).enumerate() {
            let block = &shifted[s * nints * nbins..(s + 1) * nints * nbins];
            compute.collapse_rows(block, nbins, dst);
        }

        // 4) Convolve every collapsed profile with every template.
        for (t, dst) in response.chunks_exact_mut(nshifts * nbins).enumerate() {
            compute.cycle_mul(collapsed, templates.kernel(t), dst);
        }

        // 5) Back to the phase domain, magnitudes only.
        compute.fft_inverse(response, nbins);
        compute.magnitude(response, power);

        // 6) Winning cell of the response cube.
        let peak = compute.argmax(power);
        let (t_idx, s_idx, raw_bin) = decompose(peak, nbins, nshifts);
        let width = templates.width_of(t_idx);
        let bin = (raw_bin + nbins - width / 2) % nbins;

        // 7) Recover the aligned profile for the S/N estimate.
        winner.copy_from_slice(&collapsed[s_idx * nbins..(s_idx + 1) * nbins]);
        compute.fft_inverse(winner, nbins);
        compute.magnitude(winner, best_profile);
        let snr = snr::profile_snr(best_profile, bin, width);

        // 8) First-order period correction from the winning drift.
        let drift = shifts.drift_of(s_idx) as f64;
        let opt_period = if tobs > 0.0 {
            period * (drift * period / (nbins as f64 * tobs) + 1.0)
        } else {
            period
        };

        profile.set_opt(FoldOutcome {
            snr,
            period: opt_period,
            width,
            bin,
        });
        debug!(
            "FoldOptimiser::optimise width={width} drift={drift} bin={bin} snr={snr:.2} took {:.2} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }
}
