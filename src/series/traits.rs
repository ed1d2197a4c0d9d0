//! Sample and series abstractions.

/// A raw sample type that can be widened to `f32` for processing.
pub trait Sample: Copy {
    /// Widens the sample to `f32`.
    fn to_f32(self) -> f32;
}

impl Sample for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

/// Read-only view of one uniformly sampled time series.
pub trait SeriesView {
    /// Stored sample type.
    type Sample: Sample;

    /// Number of samples.
    fn len(&self) -> usize;

    /// Sampling interval in seconds.
    fn tsamp(&self) -> f32;

    /// Borrowed sample data, `len()` long.
    fn samples(&self) -> &[Self::Sample];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observation length in seconds.
    fn tobs(&self) -> f32 {
        self.len() as f32 * self.tsamp()
    }
}
