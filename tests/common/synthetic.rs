//! Deterministic synthetic series and profiles for the integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use pulse_refine::series::TimeSeries;

/// Gaussian noise with a periodic top-hat pulse added on top.
pub fn pulsed_series(
    nsamps: usize,
    tsamp: f64,
    period: f64,
    duty_cycle: f64,
    amplitude: f32,
    seed: u64,
) -> TimeSeries<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..nsamps)
        .map(|i| {
            let noise: f32 = rng.sample(StandardNormal);
            let phase = (i as f64 * tsamp / period).fract();
            if phase < duty_cycle {
                noise + amplitude
            } else {
                noise
            }
        })
        .collect();
    TimeSeries::new(tsamp as f32, data)
}

/// Pure Gaussian noise.
pub fn noise_series(nsamps: usize, tsamp: f64, seed: u64) -> TimeSeries<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..nsamps).map(|_| rng.sample(StandardNormal)).collect();
    TimeSeries::new(tsamp as f32, data)
}

/// Noiseless `nbins x nints` stack with a top-hat pulse in every row.
///
/// The pulse is centred on `bin` in row 0 and moves `drift_per_subint` bins
/// per row. A faint alternating baseline keeps off-pulse statistics
/// non-degenerate.
pub fn tophat_subints(
    nbins: usize,
    nints: usize,
    bin: usize,
    width: usize,
    amplitude: f32,
    drift_per_subint: isize,
) -> Vec<f32> {
    let ripple = 0.02 * amplitude;
    let mut data: Vec<f32> = (0..nbins * nints)
        .map(|i| if i % 2 == 0 { ripple } else { -ripple })
        .collect();
    for k in 0..nints {
        let centre = bin as isize + drift_per_subint * k as isize;
        let start = centre - (width / 2) as isize;
        for i in 0..width {
            let idx = (start + i as isize).rem_euclid(nbins as isize) as usize;
            data[k * nbins + idx] += amplitude;
        }
    }
    data
}
