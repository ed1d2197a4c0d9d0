//! Precomputed template and phase-ramp banks.

use std::f64::consts::PI;

use crate::compute::{Complex32, Compute};

/// Bank of zero-mean top-hat pulse templates, stored in the frequency
/// domain as `ntemplates` rows of `nbins`.
///
/// Template `t` has width `(t + 1) * step` bins, a zero-mean baseline and a
/// `1 / sqrt(width)` height so that the response of a matched top-hat pulse
/// peaks at its true width.
pub struct TemplateBank {
    nbins: usize,
    step: usize,
    ntemplates: usize,
    kernels: Vec<Complex32>,
}

impl TemplateBank {
    /// Builds all templates narrower than one full rotation.
    pub fn build(compute: &dyn Compute, nbins: usize, step: usize) -> Self {
        let step = step.max(1);
        let ntemplates = (nbins / step).saturating_sub(1);
        let mut kernels = vec![Complex32::new(0.0, 0.0); ntemplates * nbins];
        for (t, row) in kernels.chunks_exact_mut(nbins).enumerate() {
            let width = (t + 1) * step;
            let height = 1.0 / (width as f32).sqrt();
            let duty = width as f32 / nbins as f32;
            for (j, v) in row.iter_mut().enumerate() {
                let x = if j < width { 1.0 - duty } else { -duty };
                *v = Complex32::new(x * height, 0.0);
            }
        }
        compute.fft_forward(&mut kernels, nbins);
        Self {
            nbins,
            step,
            ntemplates,
            kernels,
        }
    }

    pub fn ntemplates(&self) -> usize {
        self.ntemplates
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Pulse width of template `t` in bins.
    pub fn width_of(&self, t: usize) -> usize {
        (t + 1) * self.step
    }

    /// Frequency-domain kernel of template `t`.
    pub fn kernel(&self, t: usize) -> &[Complex32] {
        &self.kernels[t * self.nbins..(t + 1) * self.nbins]
    }
}

/// Bank of linear phase ramps, one per integer bin of pulse drift across
/// the observation, stored as `nshifts` blocks of `nints * nbins` factors.
///
/// Slot `s` corresponds to a signed drift of `s - nshifts / 2` bins; the
/// zero-drift ramp sits in the middle of the bank and is identically one.
pub struct ShiftBank {
    nbins: usize,
    nints: usize,
    nshifts: usize,
    kernels: Vec<Complex32>,
}

impl ShiftBank {
    /// Builds ramps covering drifts in `[-nbins / 2, nbins / 2)`.
    pub fn build(nbins: usize, nints: usize) -> Self {
        let nshifts = nbins;
        let mut kernels = Vec::with_capacity(nshifts * nints * nbins);
        let denom = (nints * nbins) as f64;
        for s in 0..nshifts {
            let drift = s as f64 - (nshifts / 2) as f64;
            for k in 0..nints {
                for j in 0..nbins {
                    let arg = 2.0 * PI * j as f64 * drift * k as f64 / denom;
                    kernels.push(Complex32::new(arg.cos() as f32, arg.sin() as f32));
                }
            }
        }
        Self {
            nbins,
            nints,
            nshifts,
            kernels,
        }
    }

    pub fn nshifts(&self) -> usize {
        self.nshifts
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn nints(&self) -> usize {
        self.nints
    }

    /// All ramp factors, `[shift][subint][bin]` row-major.
    pub fn kernels(&self) -> &[Complex32] {
        &self.kernels
    }

    /// Signed drift in bins represented by slot `s`.
    pub fn drift_of(&self, s: usize) -> isize {
        s as isize - (self.nshifts / 2) as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::HostCompute;

    #[test]
    fn template_bank_counts_and_widths() {
        let bank = TemplateBank::build(&HostCompute::new(), 64, 1);
        assert_eq!(bank.ntemplates(), 63);
        assert_eq!(bank.width_of(0), 1);
        assert_eq!(bank.width_of(62), 63);
        assert_eq!(bank.kernel(5).len(), 64);

        let coarse = TemplateBank::build(&HostCompute::new(), 64, 4);
        assert_eq!(coarse.ntemplates(), 15);
        assert_eq!(coarse.width_of(0), 4);
        assert_eq!(coarse.width_of(14), 60);
    }

    #[test]
    fn templates_are_zero_mean() {
        // Zero mean in phase shows up as an empty DC bin in frequency.
        let bank = TemplateBank::build(&HostCompute::new(), 32, 1);
        for t in 0..bank.ntemplates() {
            assert!(bank.kernel(t)[0].norm() < 1e-4, "template {t} has DC power");
        }
    }

    #[test]
    fn degenerate_bank_is_empty() {
        let bank = TemplateBank::build(&HostCompute::new(), 4, 4);
        assert_eq!(bank.ntemplates(), 0);
    }

    #[test]
    fn shift_bank_is_centred() {
        let bank = ShiftBank::build(64, 16);
        assert_eq!(bank.nshifts(), 64);
        assert_eq!(bank.drift_of(0), -32);
        assert_eq!(bank.drift_of(32), 0);
        assert_eq!(bank.drift_of(63), 31);
        assert_eq!(bank.kernels().len(), 64 * 16 * 64);
    }

    #[test]
    fn zero_drift_ramp_is_identity() {
        let bank = ShiftBank::build(16, 4);
        let mid = bank.nshifts() / 2;
        let block = &bank.kernels()[mid * 4 * 16..(mid + 1) * 4 * 16];
        for v in block {
            assert!((v.re - 1.0).abs() < 1e-6 && v.im.abs() < 1e-6);
        }
    }
}
