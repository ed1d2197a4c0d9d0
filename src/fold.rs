//! Phase folding of a time series into sub-integration profiles.
//!
//! Sample `i` lands in phase bin `floor(fract(i * tsamp / period) * nbins)`
//! of sub-integration `i * nints / nsamps`. Cells are filled with the mean
//! of their samples via a counting scatter that keeps samples in time order,
//! so folding the same input twice produces bit-identical profiles.

use std::error::Error;
use std::fmt;

use crate::series::{FoldedProfile, Sample, SeriesView};

/// Error from [`PhaseFolder::fold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    /// The series does not fit the folder's preallocated buffers.
    SeriesTooLong { nsamps: usize, capacity: usize },
    /// The profile has more cells than there are samples to fill them.
    ProfileTooFine { cells: usize, nsamps: usize },
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::SeriesTooLong { nsamps, capacity } => {
                write!(f, "series of {nsamps} samples exceeds folder capacity {capacity}")
            }
            FoldError::ProfileTooFine { cells, nsamps } => {
                write!(f, "profile with {cells} cells cannot be filled from {nsamps} samples")
            }
        }
    }
}

impl Error for FoldError {}

/// Reusable folding workspace for series of up to `capacity` samples.
pub struct PhaseFolder {
    capacity: usize,
    cell_of: Vec<u32>,
    reordered: Vec<f32>,
    counts: Vec<u32>,
}

impl PhaseFolder {
    /// Allocates a folder for series of up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cell_of: vec![0; capacity],
            reordered: vec![0.0; capacity],
            counts: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Folds `series` at `period` into `profile`, overwriting its data and
    /// fold metadata. Any optimisation outcome already on the profile is
    /// left alone.
    pub fn fold<S: SeriesView>(
        &mut self,
        series: &S,
        profile: &mut FoldedProfile,
        period: f64,
    ) -> Result<(), FoldError> {
        let nsamps = series.len();
        if nsamps > self.capacity {
            return Err(FoldError::SeriesTooLong {
                nsamps,
                capacity: self.capacity,
            });
        }
        let nbins = profile.nbins();
        let nints = profile.nints();
        let cells = nbins * nints;
        if cells > nsamps {
            return Err(FoldError::ProfileTooFine { cells, nsamps });
        }

        profile.set_fold(period, series.tobs());
        profile.data_mut().fill(0.0);
        if cells == 0 {
            return Ok(());
        }

        self.counts.clear();
        self.counts.resize(cells, 0);

        // 1) Histogram the samples over cells and remember each mapping.
        let tsamp = f64::from(series.tsamp());
        let inv_period = 1.0 / period;
        let samples = series.samples();
        for (i, cell_slot) in self.cell_of[..nsamps].iter_mut().enumerate() {
            let phase = (i as f64 * tsamp * inv_period).fract();
            let bin = ((phase * nbins as f64) as usize).min(nbins - 1);
            let subint = i * nints / nsamps;
            let cell = subint * nbins + bin;
            *cell_slot = cell as u32;
            self.counts[cell] += 1;
        }

        // 2) Exclusive prefix sum: counts[c] becomes the start of cell c.
        let mut running = 0u32;
        for c in self.counts.iter_mut() {
            let n = *c;
            *c = running;
            running += n;
        }

        // 3) Stable scatter: samples within a cell keep their time order.
        for (i, s) in samples.iter().enumerate() {
            let cell = self.cell_of[i] as usize;
            let slot = self.counts[cell] as usize;
            self.reordered[slot] = s.to_f32();
            self.counts[cell] += 1;
        }

        // 4) Reduce each run to its mean; counts[c] now holds the end of c.
        let data = profile.data_mut();
        let mut start = 0usize;
        for (cell, out) in data.iter_mut().enumerate() {
            let end = self.counts[cell] as usize;
            if end > start {
                let run = &self.reordered[start..end];
                let sum: f32 = run.iter().sum();
                *out = sum / run.len() as f32;
            }
            start = end;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimeSeries;

    #[test]
    fn commensurate_fold_places_each_sample() {
        // 8 samples, 4 per rotation: bin = i % 4, subint = i / 4.
        let series = TimeSeries::new(1.0, (0..8).map(|i| i as f32).collect());
        let mut profile = FoldedProfile::new(4, 2);
        let mut folder = PhaseFolder::new(8);
        folder.fold(&series, &mut profile, 4.0).unwrap();
        assert_eq!(profile.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(profile.period(), 4.0);
        assert_eq!(profile.tobs(), 8.0);
    }

    #[test]
    fn u8_samples_widen_while_folding() {
        // Raw byte data takes the same path as f32, widened per sample.
        let series = TimeSeries::new(1.0, vec![10u8, 20, 30, 40, 10, 20, 30, 40]);
        let mut profile = FoldedProfile::new(4, 1);
        let mut folder = PhaseFolder::new(8);
        folder.fold(&series, &mut profile, 4.0).unwrap();
        assert_eq!(profile.data(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn cells_average_their_samples() {
        // 4 rotations into one sub-integration: bin i collects i, i+4, i+8, i+12.
        let series = TimeSeries::new(1.0, (0..16).map(|i| i as f32).collect());
        let mut profile = FoldedProfile::new(4, 1);
        let mut folder = PhaseFolder::new(16);
        folder.fold(&series, &mut profile, 4.0).unwrap();
        assert_eq!(profile.data(), &[6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn refolding_is_bit_identical() {
        let series = TimeSeries::new(64e-6, (0..1024).map(|i| (i as f32 * 0.37).sin()).collect());
        let mut folder = PhaseFolder::new(1024);
        let mut first = FoldedProfile::new(16, 4);
        let mut second = FoldedProfile::new(16, 4);
        folder.fold(&series, &mut first, 3.1e-3).unwrap();
        folder.fold(&series, &mut second, 3.1e-3).unwrap();
        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn oversized_series_is_rejected() {
        let series = TimeSeries::new(1.0, vec![0.0f32; 8]);
        let mut profile = FoldedProfile::new(2, 2);
        let mut folder = PhaseFolder::new(4);
        let err = folder.fold(&series, &mut profile, 2.0).unwrap_err();
        assert_eq!(
            err,
            FoldError::SeriesTooLong {
                nsamps: 8,
                capacity: 4
            }
        );
    }

    #[test]
    fn too_fine_profile_is_rejected() {
        let series = TimeSeries::new(1.0, vec![0.0f32; 4]);
        let mut profile = FoldedProfile::new(4, 2);
        let mut folder = PhaseFolder::new(16);
        let err = folder.fold(&series, &mut profile, 2.0).unwrap_err();
        assert_eq!(
            err,
            FoldError::ProfileTooFine {
                cells: 8,
                nsamps: 4
            }
        );
    }
}
