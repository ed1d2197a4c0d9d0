//! Time-series containers used by the refinement pipeline.
//!
//! - [`TimeSeries`] / [`TimeSeriesView`]: a single dedispersed series, owned
//!   or borrowed, generic over the stored sample type.
//! - [`DispersionTrials`]: a dense block of trials sharing one sample clock,
//!   indexed by dispersion trial number.
//! - [`FoldedProfile`]: the `nbins x nints` phase/sub-integration matrix a
//!   series folds into, plus the optimisation outcome attached to it.
//!
//! Samples are stored as whatever the capture chain produced (`u8` packed
//! filterbank data or `f32`) and widened on the fly via [`Sample`].

mod profile;
mod time;
mod traits;
mod trials;

pub use profile::{FoldOutcome, FoldedProfile};
pub use time::{TimeSeries, TimeSeriesView};
pub use traits::{Sample, SeriesView};
pub use trials::DispersionTrials;
