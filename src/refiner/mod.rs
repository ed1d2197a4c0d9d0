//! Candidate refinement: fold the best search candidates and re-rank them.
//!
//! # Overview
//!
//! [`CandidateRefiner`] drives the full follow-up pass over a batch of
//! periodicity candidates:
//!
//! 1. select the top of the batch and group the survivors by dispersion
//!    trial, skipping periods outside the folding window;
//! 2. per trial, remove the red-noise ramp from the series spectrum and
//!    rebuild a whitened series, once for all of that trial's candidates;
//! 3. per candidate, resample for its acceleration, fold at its period and
//!    run the width/drift/phase optimiser;
//! 4. re-rank the whole batch by the better of detection and folded S/N.
//!
//! # Modules
//!
//! - `params`: [`RefineParams`], the tunable knobs with serde defaults.
//! - `pipeline`: [`CandidateRefiner`] and [`RefineError`].
//! - `progress`: the [`Progress`] observer seam plus log-based and no-op
//!   implementations.
//!
//! # Key ideas
//!
//! - All buffers are allocated once, sized for the longest trial, and
//!   reused for every candidate.
//! - Trials are visited in ascending index order and each is whitened
//!   exactly once, so a pass is deterministic and cheap even when many
//!   candidates share a trial.
//! - A candidate that cannot be folded is logged and skipped; the pass
//!   only aborts on structural errors such as a missing trial.

mod params;
mod pipeline;
mod progress;

pub use params::RefineParams;
pub use pipeline::{CandidateRefiner, RefineError};
pub use progress::{LogProgress, NullProgress, Progress};
