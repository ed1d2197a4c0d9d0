//! The candidate refinement pipeline.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::time::Instant;

use log::{debug, warn};

use crate::compute::{Complex32, Compute, ComputeError, HostCompute};
use crate::diagnostics::{RefineReport, TrialTrace};
use crate::fold::{FoldError, PhaseFolder};
use crate::optimise::{FoldOptimiser, OptimiseError};
use crate::series::{DispersionTrials, FoldedProfile, Sample, SeriesView, TimeSeriesView};
use crate::types::Candidate;

use super::params::RefineParams;
use super::progress::{NullProgress, Progress};

/// Error from a refinement pass.
///
/// Only structural problems surface here; per-candidate failures are
/// logged, counted and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineError {
    /// A candidate referenced a dispersion trial that does not exist.
    TrialIndexOutOfRange { index: usize, count: usize },
    /// The trial block is longer than the refiner's transform length.
    TrialTooLong { nsamps: usize, capacity: usize },
    Fold(FoldError),
    Optimise(OptimiseError),
    Compute(ComputeError),
}

impl fmt::Display for RefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefineError::TrialIndexOutOfRange { index, count } => {
                write!(f, "dispersion trial {index} out of range, block holds {count}")
            }
            RefineError::TrialTooLong { nsamps, capacity } => {
                write!(f, "trials of {nsamps} samples exceed refiner capacity {capacity}")
            }
            RefineError::Fold(err) => write!(f, "fold failed: {err}"),
            RefineError::Optimise(err) => write!(f, "optimisation failed: {err}"),
            RefineError::Compute(err) => write!(f, "compute failed: {err}"),
        }
    }
}

impl Error for RefineError {}

impl From<FoldError> for RefineError {
    fn from(err: FoldError) -> Self {
        RefineError::Fold(err)
    }
}

impl From<OptimiseError> for RefineError {
    fn from(err: OptimiseError) -> Self {
        RefineError::Optimise(err)
    }
}

impl From<ComputeError> for RefineError {
    fn from(err: ComputeError) -> Self {
        RefineError::Compute(err)
    }
}

/// Folds and optimises the strongest candidates of a periodicity search.
///
/// The refiner owns every buffer it needs, sized once at construction for
/// trials of up to `nsamps` samples (rounded up to a power of two for the
/// transforms). One instance can process any number of candidate batches.
///
/// Candidates are grouped by dispersion trial so each trial is whitened
/// exactly once no matter how many candidates point at it, and groups are
/// visited in ascending trial order so repeat runs behave identically.
pub struct CandidateRefiner<C: Compute = HostCompute> {
    params: RefineParams,
    compute: C,
    folder: PhaseFolder,
    optimiser: FoldOptimiser,
    profile: FoldedProfile,
    cleaned: Vec<f32>,
    resampled: Vec<f32>,
    spectrum: Vec<Complex32>,
    nfft: usize,
    progress: Box<dyn Progress>,
}

impl CandidateRefiner {
    /// Builds a refiner on the host compute backend.
    pub fn new(params: RefineParams, nsamps: usize) -> Result<Self, RefineError> {
        let compute = HostCompute::new().with_min_rows(params.parallel_min_rows);
        Self::with_compute(params, nsamps, compute)
    }
}

impl<C: Compute> CandidateRefiner<C> {
    /// Builds a refiner on a caller-supplied compute backend.
    pub fn with_compute(
        params: RefineParams,
        nsamps: usize,
        compute: C,
    ) -> Result<Self, RefineError> {
        let nfft = nsamps.next_power_of_two().max(1);
        let cells = params.nbins * params.nints;
        if cells > nfft {
            return Err(RefineError::Fold(FoldError::ProfileTooFine {
                cells,
                nsamps: nfft,
            }));
        }
        let step = params.template_step.max(1);
        if params.nbins < 2 * step {
            return Err(RefineError::Optimise(OptimiseError::EmptyBank {
                nbins: params.nbins,
                step: params.template_step,
            }));
        }
        let optimiser = FoldOptimiser::new(&compute, params.nbins, params.nints, step);
        Ok(Self {
            folder: PhaseFolder::new(nfft),
            optimiser,
            profile: FoldedProfile::new(params.nbins, params.nints),
            cleaned: vec![0.0; nfft],
            resampled: vec![0.0; nfft],
            spectrum: vec![Complex32::new(0.0, 0.0); nfft / 2 + 1],
            nfft,
            params,
            compute,
            progress: Box::new(NullProgress),
        })
    }

    pub fn params(&self) -> &RefineParams {
        &self.params
    }

    /// Transform length, and so the longest trial this refiner accepts.
    pub fn capacity(&self) -> usize {
        self.nfft
    }

    /// Replaces the progress observer.
    pub fn set_progress(&mut self, progress: Box<dyn Progress>) {
        self.progress = progress;
    }

    /// Refines the first `limit` candidates of `cands` against `trials` and
    /// re-ranks the whole slice by [`Candidate::ranking_snr`], best first.
    ///
    /// Candidates whose period falls outside the folding window are left
    /// untouched, as is everything past `limit`. A candidate that fails to
    /// fold is logged and skipped; only structural errors abort the pass.
    pub fn refine<T: Sample>(
        &mut self,
        cands: &mut [Candidate],
        trials: &DispersionTrials<T>,
        limit: usize,
    ) -> Result<RefineReport, RefineError> {
        let total_start = Instant::now();
        if trials.nsamps() > self.nfft {
            return Err(RefineError::TrialTooLong {
                nsamps: trials.nsamps(),
                capacity: self.nfft,
            });
        }

        let mut report = RefineReport::default();

        // 1) Pick the strongest candidates and group them by trial.
        let select_start = Instant::now();
        let count = limit.min(cands.len());
        report.selected = count;
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, cand) in cands.iter().enumerate().take(count) {
            let period = cand.period();
            if period > self.params.min_period && period < self.params.max_period {
                groups.entry(cand.dm_idx).or_default().push(idx);
                report.eligible += 1;
            } else {
                debug!(
                    "CandidateRefiner::refine candidate {idx} period {period:.6e} s outside ({:.3e}, {:.3e})",
                    self.params.min_period, self.params.max_period
                );
            }
        }
        report.groups = groups.len();
        report.timings.record("select", select_start);

        // 2) Whiten each trial once, then fold its candidates.
        self.progress.start(groups.len());
        let outcome = self.run_groups(&groups, cands, trials, &mut report);
        self.progress.stop();
        outcome?;

        let clean_total: f64 = report.trials.iter().map(|t| t.clean_ms).sum();
        let fold_total: f64 = report.trials.iter().map(|t| t.fold_ms).sum();
        report.timings.push("clean", clean_total);
        report.timings.push("fold", fold_total);

        // 3) Re-rank the full batch, refined or not.
        let sort_start = Instant::now();
        cands.sort_by(|a, b| b.ranking_snr().total_cmp(&a.ranking_snr()));
        report.timings.record("sort", sort_start);
        report.timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "CandidateRefiner::refine selected={} eligible={} refined={} failed={} took {:.2} ms",
            report.selected, report.eligible, report.refined, report.failed, report.timings.total_ms
        );
        Ok(report)
    }

    fn run_groups<T: Sample>(
        &mut self,
        groups: &BTreeMap<usize, Vec<usize>>,
        cands: &mut [Candidate],
        trials: &DispersionTrials<T>,
        report: &mut RefineReport,
    ) -> Result<(), RefineError> {
        for (&dm_idx, members) in groups {
            let trial = trials
                .trial(dm_idx)
                .ok_or(RefineError::TrialIndexOutOfRange {
                    index: dm_idx,
                    count: trials.ntrials(),
                })?;

            let clean_start = Instant::now();
            self.clean_trial(&trial)?;
            let clean_ms = clean_start.elapsed().as_secs_f64() * 1000.0;

            let fold_start = Instant::now();
            let mut failed = 0usize;
            for &cand_idx in members {
                let cand = &mut cands[cand_idx];
                match self.refine_candidate(cand, trial.tsamp, trial.dm, trial.len()) {
                    Ok(()) => report.refined += 1,
                    Err(err) => {
                        warn!(
                            "skipping candidate {cand_idx} (f0={:.6} Hz, dm={:.2}): {err}",
                            cand.freq, cand.dm
                        );
                        failed += 1;
                    }
                }
            }
            report.failed += failed;
            let fold_ms = fold_start.elapsed().as_secs_f64() * 1000.0;

            debug!(
                "CandidateRefiner::refine trial {dm_idx}: {} candidate(s), {failed} failed, clean {clean_ms:.2} ms, fold {fold_ms:.2} ms",
                members.len()
            );
            report.trials.push(TrialTrace {
                dm_idx,
                dm: trial.dm,
                candidates: members.len(),
                clean_ms,
                fold_ms,
            });
            self.progress.advance();
        }
        Ok(())
    }

    /// Loads one trial into the transform buffer, whitens its spectrum and
    /// writes the cleaned series back.
    fn clean_trial<T: Sample>(&mut self, trial: &TimeSeriesView<'_, T>) -> Result<(), RefineError> {
        let nsamps = trial.len();
        for (dst, s) in self.cleaned[..nsamps].iter_mut().zip(trial.samples()) {
            *dst = s.to_f32();
        }
        self.cleaned[nsamps..].fill(0.0);
        self.compute.rfft(&mut self.cleaned, &mut self.spectrum)?;
        self.compute.deredden(&mut self.spectrum);
        self.compute.irfft(&mut self.spectrum, &mut self.cleaned)?;
        Ok(())
    }

    /// Resamples the cleaned trial for this candidate's acceleration, folds
    /// it at the candidate period and records the optimisation outcome.
    fn refine_candidate(
        &mut self,
        cand: &mut Candidate,
        tsamp: f32,
        dm: f32,
        nsamps: usize,
    ) -> Result<(), RefineError> {
        let period = cand.period();
        self.compute.resample(
            &self.cleaned[..nsamps],
            &mut self.resampled[..nsamps],
            cand.acc,
            tsamp,
        );
        let series = TimeSeriesView {
            tsamp,
            dm,
            data: &self.resampled[..nsamps],
        };
        self.folder.fold(&series, &mut self.profile, period)?;
        self.optimiser.optimise(&self.compute, &mut self.profile)?;
        if let Some(opt) = self.profile.opt() {
            cand.folded_snr = Some(opt.snr);
            cand.opt_period = Some(opt.period);
            cand.opt_width = Some(opt.width);
            cand.opt_bin = Some(opt.bin);
        }
        Ok(())
    }
}
