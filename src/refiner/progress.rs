//! Progress reporting hooks for long refinement passes.

use log::debug;

/// Observer of refinement progress at dispersion-trial granularity.
///
/// Once candidate selection succeeds,
/// [`CandidateRefiner::refine`](super::CandidateRefiner::refine) calls
/// `start` exactly once, `advance` after each trial group and `stop`
/// exactly once at the end, also when the pass fails mid-run or processes
/// no trials at all.
pub trait Progress {
    fn start(&mut self, groups: usize);
    fn advance(&mut self);
    fn stop(&mut self);
}

/// Discards all progress events.
#[derive(Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn start(&mut self, _groups: usize) {}
    fn advance(&mut self) {}
    fn stop(&mut self) {}
}

/// Reports progress through the `log` facade.
#[derive(Default)]
pub struct LogProgress {
    groups: usize,
    done: usize,
}

impl Progress for LogProgress {
    fn start(&mut self, groups: usize) {
        self.groups = groups;
        self.done = 0;
        debug!("refining candidates over {groups} dispersion trial(s)");
    }

    fn advance(&mut self) {
        self.done += 1;
        debug!("trial {}/{} done", self.done, self.groups);
    }

    fn stop(&mut self) {
        debug!("refinement pass complete");
    }
}
