//! CPU compute backend built on `rustfft` and `realfft`.

use std::cell::RefCell;

use realfft::RealFftPlanner;
use rustfft::{Fft, FftPlanner};

use super::{Complex32, Compute, ComputeError};

/// Speed of light in m/s, used by the acceleration resampler.
const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

/// Spectral bins per whitening block in [`Compute::deredden`].
const DEREDDEN_WINDOW: usize = 128;

/// Host implementation of [`Compute`].
///
/// FFT plans are cached by the planners, and one shared scratch buffer is
/// grown lazily to the largest transform seen. With the `parallel` feature
/// enabled, batched transforms with at least `par_min_rows` rows fan out
/// over the rayon thread pool with per-thread scratch.
pub struct HostCompute {
    planner: RefCell<FftPlanner<f32>>,
    real: RefCell<RealFftPlanner<f32>>,
    scratch: RefCell<Vec<Complex32>>,
    powers: RefCell<Vec<f32>>,
    par_min_rows: usize,
}

impl HostCompute {
    pub fn new() -> Self {
        Self {
            planner: RefCell::new(FftPlanner::new()),
            real: RefCell::new(RealFftPlanner::new()),
            scratch: RefCell::new(Vec::new()),
            powers: RefCell::new(Vec::new()),
            par_min_rows: 64,
        }
    }

    /// Sets the minimum batch size for the parallel FFT path.
    pub fn with_min_rows(mut self, rows: usize) -> Self {
        self.par_min_rows = rows.max(1);
        self
    }

    fn use_parallel(&self, rows: usize) -> bool {
        cfg!(feature = "parallel") && rows >= self.par_min_rows
    }

    /// Runs `fft` over every `fft.len()` chunk of `buf`.
    fn run_rows(&self, buf: &mut [Complex32], fft: &dyn Fft<f32>) {
        let row_len = fft.len();
        if row_len == 0 || buf.len() < row_len {
            return;
        }
        let rows = buf.len() / row_len;
        if self.use_parallel(rows) {
            #[cfg(feature = "parallel")]
            {
                run_rows_parallel(buf, fft);
                return;
            }
        }
        let mut scratch = self.scratch.borrow_mut();
        let need = fft.get_inplace_scratch_len();
        if scratch.len() < need {
            scratch.resize(need, Complex32::new(0.0, 0.0));
        }
        fft.process_with_scratch(buf, scratch.as_mut_slice());
    }
}

impl Default for HostCompute {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "parallel")]
fn run_rows_parallel(buf: &mut [Complex32], fft: &dyn Fft<f32>) {
    use rayon::prelude::*;

    let row_len = fft.len();
    let scratch_len = fft.get_inplace_scratch_len();
    buf.par_chunks_exact_mut(row_len).for_each_init(
        || vec![Complex32::new(0.0, 0.0); scratch_len],
        |scratch, row| fft.process_with_scratch(row, scratch),
    );
}

impl Compute for HostCompute {
    fn fft_forward(&self, buf: &mut [Complex32], row_len: usize) {
        if row_len == 0 || buf.is_empty() {
            return;
        }
        let fft = self.planner.borrow_mut().plan_fft_forward(row_len);
        self.run_rows(buf, fft.as_ref());
    }

    fn fft_inverse(&self, buf: &mut [Complex32], row_len: usize) {
        if row_len == 0 || buf.is_empty() {
            return;
        }
        let fft = self.planner.borrow_mut().plan_fft_inverse(row_len);
        self.run_rows(buf, fft.as_ref());
        let scale = 1.0 / row_len as f32;
        for v in buf.iter_mut() {
            *v *= scale;
        }
    }

    fn rfft(&self, input: &mut [f32], spectrum: &mut [Complex32]) -> Result<(), ComputeError> {
        let mismatch = ComputeError::RealTransform {
            len: input.len(),
            spectrum: spectrum.len(),
        };
        if input.is_empty() {
            return Err(mismatch);
        }
        let fft = self.real.borrow_mut().plan_fft_forward(input.len());
        let mut scratch = self.scratch.borrow_mut();
        let need = fft.get_scratch_len();
        if scratch.len() < need {
            scratch.resize(need, Complex32::new(0.0, 0.0));
        }
        fft.process_with_scratch(input, spectrum, scratch.as_mut_slice())
            .map_err(|_| mismatch)
    }

    fn irfft(&self, spectrum: &mut [Complex32], output: &mut [f32]) -> Result<(), ComputeError> {
        let mismatch = ComputeError::RealTransform {
            len: output.len(),
            spectrum: spectrum.len(),
        };
        if output.is_empty() {
            return Err(mismatch);
        }
        let fft = self.real.borrow_mut().plan_fft_inverse(output.len());
        let mut scratch = self.scratch.borrow_mut();
        let need = fft.get_scratch_len();
        if scratch.len() < need {
            scratch.resize(need, Complex32::new(0.0, 0.0));
        }
        fft.process_with_scratch(spectrum, output, scratch.as_mut_slice())
            .map_err(|_| mismatch)?;
        let scale = 1.0 / output.len() as f32;
        for v in output.iter_mut() {
            *v *= scale;
        }
        Ok(())
    }

    fn promote(&self, src: &[f32], dst: &mut [Complex32]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = Complex32::new(s, 0.0);
        }
    }

    fn magnitude(&self, src: &[Complex32], dst: &mut [f32]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.norm();
        }
    }

    fn cycle_mul(&self, a: &[Complex32], b: &[Complex32], dst: &mut [Complex32]) {
        debug_assert_eq!(a.len(), dst.len());
        if b.is_empty() {
            return;
        }
        for (i, (d, &x)) in dst.iter_mut().zip(a).enumerate() {
            *d = x * b[i % b.len()];
        }
    }

    fn collapse_rows(&self, src: &[Complex32], row_len: usize, dst: &mut [Complex32]) {
        dst.fill(Complex32::new(0.0, 0.0));
        if row_len == 0 {
            return;
        }
        for row in src.chunks_exact(row_len) {
            for (acc, &v) in dst.iter_mut().zip(row) {
                *acc += v;
            }
        }
    }

    fn argmax(&self, buf: &[f32]) -> usize {
        let mut best = f32::NEG_INFINITY;
        let mut best_idx = 0;
        for (i, &v) in buf.iter().enumerate() {
            if v > best {
                best = v;
                best_idx = i;
            }
        }
        best_idx
    }

    fn resample(&self, src: &[f32], dst: &mut [f32], acc: f32, tsamp: f32) {
        let nsamps = src.len().min(dst.len());
        if nsamps == 0 {
            return;
        }
        let last = nsamps - 1;
        // Quadratic sample-index remapping for constant acceleration; the
        // drift is zero at both ends of the observation.
        let fact = f64::from(acc) * f64::from(tsamp) / (2.0 * SPEED_OF_LIGHT);
        for (t, out) in dst[..nsamps].iter_mut().enumerate() {
            let x = t as f64;
            let j = x + fact * x * (x - nsamps as f64);
            let j = (j.round().max(0.0) as usize).min(last);
            *out = src[j];
        }
    }

    fn deredden(&self, spectrum: &mut [Complex32]) {
        if spectrum.is_empty() {
            return;
        }
        // The DC bin carries the series mean, not signal.
        spectrum[0] = Complex32::new(0.0, 0.0);
        let mut powers = self.powers.borrow_mut();
        for block in spectrum[1..].chunks_mut(DEREDDEN_WINDOW) {
            powers.clear();
            powers.extend(block.iter().map(|v| v.norm_sqr()));
            powers.sort_unstable_by(f32::total_cmp);
            let median = powers[powers.len() / 2];
            if median > 0.0 {
                let scale = 1.0 / median.sqrt();
                for v in block.iter_mut() {
                    *v *= scale;
                }
            }
        }
    }
}
