//! Fourier-domain optimisation of folded profiles.
//!
//! # Overview
//!
//! A profile folded at a slightly wrong period shows its pulse drifting in
//! phase from one sub-integration to the next, and the pulse width is not
//! known in advance. [`FoldOptimiser`] searches both at once: it moves the
//! sub-integration spectra through a bank of linear phase ramps (one per
//! integer bin of drift across the observation), collapses each shifted
//! copy into an integrated profile, convolves every collapsed profile with
//! a bank of zero-mean top-hat templates, and picks the
//! `(template, shift, bin)` cell with the largest response magnitude.
//!
//! # Modules
//!
//! - `banks`: [`TemplateBank`] and [`ShiftBank`], precomputed in the
//!   frequency domain at construction.
//! - `snr`: the classic on/off-pulse signal-to-noise estimate evaluated on
//!   the recovered profile.
//!
//! # Key ideas
//!
//! - All shifts and all templates are applied as batched element-wise
//!   multiplies against the same sub-integration spectra, so one forward
//!   transform of the profile serves the whole search grid.
//! - The response cube is laid out `[template][shift][bin]`; [`decompose`]
//!   maps a flat argmax index back to grid coordinates.
//! - The winning drift converts to a first-order period correction, and the
//!   S/N is re-estimated on the aligned profile rather than taken from the
//!   raw response peak.

mod banks;
mod optimiser;
mod snr;

pub use banks::{ShiftBank, TemplateBank};
pub use optimiser::{decompose, FoldOptimiser, OptimiseError};
