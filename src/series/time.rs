//! Owned and borrowed single-trial series.

use super::traits::{Sample, SeriesView};

/// An owned dedispersed time series.
#[derive(Clone, Debug)]
pub struct TimeSeries<T> {
    /// Sampling interval in seconds.
    pub tsamp: f32,
    /// Sample data.
    pub data: Vec<T>,
}

impl<T: Sample> TimeSeries<T> {
    pub fn new(tsamp: f32, data: Vec<T>) -> Self {
        Self { tsamp, data }
    }

    /// Borrows the series as a view tagged with a dispersion measure.
    pub fn view(&self, dm: f32) -> TimeSeriesView<'_, T> {
        TimeSeriesView {
            tsamp: self.tsamp,
            dm,
            data: &self.data,
        }
    }
}

impl<T: Sample> SeriesView for TimeSeries<T> {
    type Sample = T;

    fn len(&self) -> usize {
        self.data.len()
    }

    fn tsamp(&self) -> f32 {
        self.tsamp
    }

    fn samples(&self) -> &[T] {
        &self.data
    }
}

/// A borrowed slice of one dispersion trial.
#[derive(Clone, Copy, Debug)]
pub struct TimeSeriesView<'a, T> {
    /// Sampling interval in seconds.
    pub tsamp: f32,
    /// Dispersion measure of the trial, pc/cm^3.
    pub dm: f32,
    /// Borrowed sample data.
    pub data: &'a [T],
}

impl<T: Sample> SeriesView for TimeSeriesView<'_, T> {
    type Sample = T;

    fn len(&self) -> usize {
        self.data.len()
    }

    fn tsamp(&self) -> f32 {
        self.tsamp
    }

    fn samples(&self) -> &[T] {
        self.data
    }
}
