//! End-to-end refinement passes over synthetic dispersion trials.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::synthetic::{noise_series, pulsed_series};
use pulse_refine::compute::{Complex32, Compute, ComputeError, HostCompute};
use pulse_refine::prelude::*;
use pulse_refine::refiner::RefineError;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Host compute that counts whitening passes.
struct CountingCompute {
    inner: HostCompute,
    dereddens: Rc<Cell<usize>>,
}

impl Compute for CountingCompute {
    fn fft_forward(&self, buf: &mut [Complex32], row_len: usize) {
        self.inner.fft_forward(buf, row_len)
    }

    fn fft_inverse(&self, buf: &mut [Complex32], row_len: usize) {
        self.inner.fft_inverse(buf, row_len)
    }

    fn rfft(&self, input: &mut [f32], spectrum: &mut [Complex32]) -> Result<(), ComputeError> {
        self.inner.rfft(input, spectrum)
    }

    fn irfft(&self, spectrum: &mut [Complex32], output: &mut [f32]) -> Result<(), ComputeError> {
        self.inner.irfft(spectrum, output)
    }

    fn promote(&self, src: &[f32], dst: &mut [Complex32]) {
        self.inner.promote(src, dst)
    }

    fn magnitude(&self, src: &[Complex32], dst: &mut [f32]) {
        self.inner.magnitude(src, dst)
    }

    fn cycle_mul(&self, a: &[Complex32], b: &[Complex32], dst: &mut [Complex32]) {
        self.inner.cycle_mul(a, b, dst)
    }

    fn collapse_rows(&self, src: &[Complex32], row_len: usize, dst: &mut [Complex32]) {
        self.inner.collapse_rows(src, row_len, dst)
    }

    fn argmax(&self, buf: &[f32]) -> usize {
        self.inner.argmax(buf)
    }

    fn resample(&self, src: &[f32], dst: &mut [f32], acc: f32, tsamp: f32) {
        self.inner.resample(src, dst, acc, tsamp)
    }

    fn deredden(&self, spectrum: &mut [Complex32]) {
        self.dereddens.set(self.dereddens.get() + 1);
        self.inner.deredden(spectrum)
    }
}

/// Two trials, the first carrying a 15.625 Hz pulsar.
fn two_trial_block(nsamps: usize, tsamp: f64) -> DispersionTrials<f32> {
    let pulsar = pulsed_series(nsamps, tsamp, 0.064, 0.08, 4.0, 3);
    let noise = noise_series(nsamps, tsamp, 4);
    let mut data = pulsar.data;
    data.extend_from_slice(&noise.data);
    DispersionTrials::from_flat(data, nsamps, tsamp as f32, vec![0.0, 25.0])
}

#[test]
fn shared_trials_are_whitened_once_and_ranking_holds() {
    init_logs();
    let nsamps = 8192;
    let trials = two_trial_block(nsamps, 512e-6);
    let mut cands = vec![
        Candidate::new(15.625, 0.0, 0, 0.0, 9.0),
        Candidate::new(4.0, 0.0, 1, 25.0, 7.5),
        Candidate::new(31.25, 0.0, 0, 0.0, 7.0),
    ];

    let counter = Rc::new(Cell::new(0));
    let compute = CountingCompute {
        inner: HostCompute::new(),
        dereddens: Rc::clone(&counter),
    };
    let mut refiner =
        CandidateRefiner::with_compute(RefineParams::default(), nsamps, compute).unwrap();
    let report = refiner.refine(&mut cands, &trials, 3).unwrap();

    // Three candidates over two trials means exactly two whitening passes.
    assert_eq!(counter.get(), 2);
    assert_eq!(report.groups, 2);
    assert_eq!(report.selected, 3);
    assert_eq!(report.eligible, 3);
    assert_eq!(report.refined, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.trials.len(), 2);
    assert!(report.trials[0].dm_idx < report.trials[1].dm_idx);

    assert!(cands.iter().all(|c| c.folded_snr.is_some()));
    for pair in cands.windows(2) {
        assert!(pair[0].ranking_snr() >= pair[1].ranking_snr());
    }
    // The injected pulsar tops the board on its folded S/N.
    assert_eq!(cands[0].freq, 15.625);
    assert!(
        cands[0].folded_snr.unwrap() > 10.0,
        "pulsar folded snr too low: {:?}",
        cands[0].folded_snr
    );
    assert!(cands[0].opt_period.is_some());
    assert!(cands[0].opt_width.is_some());
    assert!(cands[0].opt_bin.is_some());
}

#[test]
fn out_of_window_periods_keep_their_detection_rank() {
    init_logs();
    let nsamps = 4096;
    let noise = noise_series(nsamps, 256e-6, 9);
    let trials = DispersionTrials::from_flat(noise.data, nsamps, 256e-6, vec![0.0]);
    // A 2 kHz spin is below the folding window's 1 ms floor.
    let mut cands = vec![
        Candidate::new(2000.0, 0.0, 0, 0.0, 50.0),
        Candidate::new(12.5, 0.0, 0, 0.0, 8.0),
    ];
    let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps).unwrap();
    let report = refiner.refine(&mut cands, &trials, 2).unwrap();

    assert_eq!(report.selected, 2);
    assert_eq!(report.eligible, 1);
    assert_eq!(report.refined, 1);
    let fast = cands.iter().find(|c| c.freq == 2000.0).unwrap();
    assert!(fast.folded_snr.is_none());
    // Its detection S/N of 50 still tops the board.
    assert_eq!(cands[0].freq, 2000.0);
}

#[test]
fn short_trials_fail_per_candidate_without_aborting() {
    init_logs();
    let nsamps = 512;
    let noise = noise_series(nsamps, 256e-6, 21);
    let trials = DispersionTrials::from_flat(noise.data, nsamps, 256e-6, vec![0.0]);
    let mut cands = vec![
        Candidate::new(12.5, 0.0, 0, 0.0, 8.0),
        Candidate::new(25.0, 0.0, 0, 0.0, 7.0),
    ];
    // Refiner sized for longer trials; 512 samples cannot fill 64x16 cells.
    let mut refiner = CandidateRefiner::new(RefineParams::default(), 4096).unwrap();
    let report = refiner.refine(&mut cands, &trials, 2).unwrap();

    assert_eq!(report.refined, 0);
    assert_eq!(report.failed, 2);
    assert!(cands.iter().all(|c| c.folded_snr.is_none()));
}

#[test]
fn missing_trial_aborts_the_pass() {
    init_logs();
    let nsamps = 2048;
    let noise = noise_series(nsamps, 256e-6, 2);
    let trials = DispersionTrials::from_flat(noise.data, nsamps, 256e-6, vec![0.0]);
    let mut cands = vec![Candidate::new(12.5, 0.0, 99, 0.0, 8.0)];
    let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps).unwrap();
    let err = refiner.refine(&mut cands, &trials, 1).unwrap_err();
    assert_eq!(err, RefineError::TrialIndexOutOfRange { index: 99, count: 1 });
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Event {
    Start(usize),
    Advance,
    Stop,
}

struct RecordingProgress(Rc<RefCell<Vec<Event>>>);

impl Progress for RecordingProgress {
    fn start(&mut self, groups: usize) {
        self.0.borrow_mut().push(Event::Start(groups));
    }

    fn advance(&mut self) {
        self.0.borrow_mut().push(Event::Advance);
    }

    fn stop(&mut self) {
        self.0.borrow_mut().push(Event::Stop);
    }
}

#[test]
fn progress_covers_each_trial_group() {
    init_logs();
    let nsamps = 2048;
    let trials = two_trial_block(nsamps, 512e-6);
    let mut cands = vec![
        Candidate::new(15.625, 0.0, 0, 0.0, 9.0),
        Candidate::new(8.0, 0.0, 1, 25.0, 7.0),
    ];
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps).unwrap();
    refiner.set_progress(Box::new(RecordingProgress(Rc::clone(&events))));
    refiner.refine(&mut cands, &trials, 2).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![Event::Start(2), Event::Advance, Event::Advance, Event::Stop]
    );
}

#[test]
fn empty_batch_is_a_no_op_with_full_progress_lifecycle() {
    init_logs();
    let nsamps = 2048;
    let noise = noise_series(nsamps, 256e-6, 7);
    let trials = DispersionTrials::from_flat(noise.data, nsamps, 256e-6, vec![0.0]);
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps).unwrap();
    refiner.set_progress(Box::new(RecordingProgress(Rc::clone(&events))));

    let mut cands: Vec<Candidate> = Vec::new();
    let report = refiner.refine(&mut cands, &trials, 5).unwrap();
    assert_eq!(report.selected, 0);
    assert_eq!(report.refined, 0);
    assert_eq!(report.groups, 0);
    assert_eq!(*events.borrow(), vec![Event::Start(0), Event::Stop]);
}

#[test]
fn limit_leaves_the_tail_unrefined_but_ranked() {
    init_logs();
    let nsamps = 2048;
    let noise = noise_series(nsamps, 256e-6, 31);
    let trials = DispersionTrials::from_flat(noise.data, nsamps, 256e-6, vec![0.0]);
    let mut cands = vec![
        Candidate::new(12.5, 0.0, 0, 0.0, 8.0),
        Candidate::new(6.25, 0.0, 0, 0.0, 30.0),
    ];
    let mut refiner = CandidateRefiner::new(RefineParams::default(), nsamps).unwrap();
    let report = refiner.refine(&mut cands, &trials, 1).unwrap();

    assert_eq!(report.selected, 1);
    // Only the first listed candidate was folded.
    let unrefined = cands.iter().find(|c| c.freq == 6.25).unwrap();
    assert!(unrefined.folded_snr.is_none());
    // Folding noise cannot beat a 30 sigma detection, so the unrefined
    // candidate still ranks first.
    assert_eq!(cands[0].freq, 6.25);
}
