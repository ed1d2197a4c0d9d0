//! Dense storage for a set of dispersion trials.

use super::time::TimeSeriesView;
use super::traits::Sample;

/// A block of dedispersed time series, one per dispersion measure trial.
///
/// All trials share the same length and sample clock and are stored
/// back to back in a single flat buffer, trial-major.
#[derive(Clone, Debug)]
pub struct DispersionTrials<T> {
    data: Vec<T>,
    nsamps: usize,
    tsamp: f32,
    dms: Vec<f32>,
}

impl<T: Sample> DispersionTrials<T> {
    /// Wraps a flat trial-major buffer.
    ///
    /// `data` should hold `dms.len() * nsamps` samples. Trials whose slice
    /// falls past the end of a short buffer come back as `None` from
    /// [`trial`](Self::trial).
    pub fn from_flat(data: Vec<T>, nsamps: usize, tsamp: f32, dms: Vec<f32>) -> Self {
        Self {
            data,
            nsamps,
            tsamp,
            dms,
        }
    }

    /// Number of dispersion trials.
    pub fn ntrials(&self) -> usize {
        self.dms.len()
    }

    /// Samples per trial.
    pub fn nsamps(&self) -> usize {
        self.nsamps
    }

    /// Sampling interval in seconds.
    pub fn tsamp(&self) -> f32 {
        self.tsamp
    }

    /// Dispersion measures, one per trial.
    pub fn dms(&self) -> &[f32] {
        &self.dms
    }

    /// Borrows trial `idx`, or `None` if the index or the backing buffer is
    /// out of range.
    pub fn trial(&self, idx: usize) -> Option<TimeSeriesView<'_, T>> {
        let dm = *self.dms.get(idx)?;
        let start = idx.checked_mul(self.nsamps)?;
        let end = start.checked_add(self.nsamps)?;
        let data = self.data.get(start..end)?;
        Some(TimeSeriesView {
            tsamp: self.tsamp,
            dm,
            data,
        })
    }
}
