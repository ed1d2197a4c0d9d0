//! Folding behaviour on realistic synthetic series.

mod common;

use common::synthetic::{noise_series, pulsed_series};
use pulse_refine::fold::PhaseFolder;
use pulse_refine::series::FoldedProfile;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn fold_recovers_an_injected_pulse() {
    init_logs();
    let nsamps = 1 << 16;
    // 0.128 s at 256 us is exactly 500 samples per rotation.
    let series = pulsed_series(nsamps, 256e-6, 0.128, 0.05, 4.0, 11);
    let mut profile = FoldedProfile::new(64, 16);
    let mut folder = PhaseFolder::new(nsamps);
    folder.fold(&series, &mut profile, 0.128).unwrap();

    // Duty cycle 0.05 of 64 bins puts the pulse in bins 0..=3.
    let integrated = profile.integrated();
    let peak_bin = integrated
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!(peak_bin <= 3, "pulse peak landed in bin {peak_bin}");
    assert!(
        integrated[1] > 32.0,
        "pulse bin too weak: {}",
        integrated[1]
    );

    // Off-pulse bins hold only noise.
    let off: Vec<f32> = integrated[10..60].to_vec();
    let mean_abs = off.iter().map(|v| v.abs()).sum::<f32>() / off.len() as f32;
    assert!(mean_abs < 1.0, "off-pulse level too high: {mean_abs}");

    // Every sub-integration sees the pulse at the same phase.
    for k in 0..profile.nints() {
        let row = profile.subint(k).unwrap();
        assert!(row[1] > 2.0, "subint {k} lost the pulse: {}", row[1]);
    }
}

#[test]
fn noise_folds_flat() {
    init_logs();
    let nsamps = 1 << 16;
    let series = noise_series(nsamps, 256e-6, 23);
    let mut profile = FoldedProfile::new(64, 16);
    let mut folder = PhaseFolder::new(nsamps);
    // Non-commensurate period so samples spread over all cells.
    folder.fold(&series, &mut profile, 0.1037).unwrap();
    for (cell, &v) in profile.data().iter().enumerate() {
        assert!(v.abs() < 1.0, "cell {cell} is an outlier: {v}");
    }
}

#[test]
fn refolding_large_input_is_bit_identical() {
    init_logs();
    let nsamps = 1 << 15;
    let series = pulsed_series(nsamps, 128e-6, 0.0721, 0.1, 2.0, 5);
    let mut folder = PhaseFolder::new(nsamps);
    let mut first = FoldedProfile::new(64, 16);
    let mut second = FoldedProfile::new(64, 16);
    folder.fold(&series, &mut first, 0.0721).unwrap();
    folder.fold(&series, &mut second, 0.0721).unwrap();
    assert_eq!(first.data(), second.data());
}
