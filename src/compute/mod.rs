//! Numeric kernels behind the refinement pipeline.
//!
//! # Overview
//!
//! Everything the refiner does to bulk sample data goes through the
//! [`Compute`] trait: batched complex FFTs, real transforms, spectral
//! whitening, acceleration resampling and a handful of element-wise
//! kernels. The pipeline code owns the buffers and the orchestration; the
//! compute service owns the transforms and any scratch they need. Tests
//! substitute instrumented implementations through the same seam.
//!
//! [`HostCompute`] is the CPU implementation, built on `rustfft` and
//! `realfft`, with optional `rayon` batching behind the `parallel` feature.
//!
//! # Conventions
//!
//! - Batched operations treat a flat buffer as consecutive rows of
//!   `row_len` elements.
//! - Inverse transforms are scaled by `1 / row_len` so that a forward and
//!   inverse pass round-trips the input.
//! - Real transforms of an `n`-point series use `n / 2 + 1` spectral bins.

use std::error::Error;
use std::fmt;

pub use rustfft::num_complex::Complex32;

pub mod host;

pub use host::HostCompute;

/// Error from a compute kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// A real transform was handed buffers of incompatible lengths.
    RealTransform { len: usize, spectrum: usize },
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeError::RealTransform { len, spectrum } => write!(
                f,
                "real transform of {len} samples incompatible with {spectrum} spectral bins"
            ),
        }
    }
}

impl Error for ComputeError {}

/// Numeric backend for the refinement pipeline.
///
/// Implementations may keep interior scratch; all methods take `&self` so a
/// single service can be shared across the pipeline stages.
pub trait Compute {
    /// In-place forward complex FFT of every `row_len` chunk of `buf`.
    fn fft_forward(&self, buf: &mut [Complex32], row_len: usize);

    /// In-place inverse complex FFT of every `row_len` chunk of `buf`,
    /// scaled by `1 / row_len`.
    fn fft_inverse(&self, buf: &mut [Complex32], row_len: usize);

    /// Forward real-to-complex transform. `input` is overwritten with
    /// scratch data; `spectrum` must hold `input.len() / 2 + 1` bins.
    fn rfft(&self, input: &mut [f32], spectrum: &mut [Complex32]) -> Result<(), ComputeError>;

    /// Inverse complex-to-real transform, scaled by `1 / output.len()`.
    /// `spectrum` is overwritten with scratch data.
    fn irfft(&self, spectrum: &mut [Complex32], output: &mut [f32]) -> Result<(), ComputeError>;

    /// Widens real samples into the real part of `dst`.
    fn promote(&self, src: &[f32], dst: &mut [Complex32]);

    /// Writes the magnitude of each element of `src` into `dst`.
    fn magnitude(&self, src: &[Complex32], dst: &mut [f32]);

    /// Element-wise product with a cyclically repeated factor:
    /// `dst[i] = a[i] * b[i % b.len()]`.
    fn cycle_mul(&self, a: &[Complex32], b: &[Complex32], dst: &mut [Complex32]);

    /// Sums the `row_len`-long rows of `src` element-wise into `dst`.
    fn collapse_rows(&self, src: &[Complex32], row_len: usize, dst: &mut [Complex32]);

    /// Index of the first maximum of `buf`. NaN entries never win.
    fn argmax(&self, buf: &[f32]) -> usize;

    /// Resamples `src` into `dst`, undoing a constant line-of-sight
    /// acceleration `acc` (m/s^2) at sampling interval `tsamp` (s).
    fn resample(&self, src: &[f32], dst: &mut [f32], acc: f32, tsamp: f32);

    /// Whitens a real spectrum in place by dividing out a running estimate
    /// of the local noise power, removing the red-noise ramp.
    fn deredden(&self, spectrum: &mut [Complex32]);
}
