#![doc = include_str!("../README.md")]

pub mod compute;
pub mod config;
pub mod diagnostics;
pub mod fold;
pub mod optimise;
pub mod refiner;
pub mod series;
pub mod types;

pub use compute::{Compute, HostCompute};
pub use diagnostics::{RefineReport, TrialTrace};
pub use refiner::{CandidateRefiner, Progress, RefineError, RefineParams};
pub use types::Candidate;

/// Common imports for driving a refinement pass.
///
/// ```no_run
/// use pulse_refine::prelude::*;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let nsamps = 1 << 16;
///     let trials = DispersionTrials::from_flat(
///         vec![0.0f32; nsamps],
///         nsamps,
///         256e-6,
///         vec![0.0],
///     );
///     let mut cands = vec![Candidate::new(7.8125, 0.0, 0, 0.0, 9.0)];
///     let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps)?;
///     let limit = cands.len();
///     refiner.refine(&mut cands, &trials, limit)?;
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::compute::{Compute, HostCompute};
    pub use crate::refiner::{CandidateRefiner, LogProgress, Progress, RefineParams};
    pub use crate::series::{DispersionTrials, FoldedProfile, TimeSeries};
    pub use crate::types::Candidate;
}
