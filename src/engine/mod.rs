//! The measure → smooth → map → render → play loop.
//!
//! Single-threaded and cooperative: each iteration runs to completion before
//! the next begins. The only asynchronous boundary is the capture
//! peripheral's internal buffering, reached through a short bounded poll, so
//! worst-case loop latency stays bounded even when the sensor goes quiet.
//!
//! No locking anywhere: the synthesizer phases are the only cross-iteration
//! state and they are owned here, mutated by nothing else.

use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::control::{self, ControlParams};
use crate::io::pacing::{PaceClock, PacedPlayer};
use crate::io::ToneSink;
use crate::sensor::calibration::{plausible, CalibrationTracker, TrackerPhase, CALIBRATION_SAMPLES};
use crate::sensor::sampler::PeriodSampler;
use crate::sensor::PulseCapture;
use crate::synth::ToneVoice;
use crate::BUFFER_SIZE;
use crate::SAMPLE_RATE;

/// Idle wait after a dropped or implausible reading before polling again.
const DROPOUT_IDLE: Duration = Duration::from_millis(10);

/// Minimum interval between status reports.
const STATUS_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot of the live control state, reported while steady.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub smoothed_hz: f32,
    /// Positive deviation above baseline; zero when at or below it.
    pub delta_hz: f32,
    pub frequency_hz: f32,
    pub volume: f32,
}

/// One-way, best-effort observer of engine progress.
///
/// Reports may be dropped or ignored without affecting control behavior.
/// All methods default to no-ops so observers implement only what they show.
pub trait StatusSink {
    /// Calibration progress, throttled. `accepted` out of `target` readings.
    fn calibrating(&mut self, _accepted: usize, _target: usize) {}

    /// Fired exactly once, on the calibration → steady transition.
    fn calibrated(&mut self, _baseline_hz: f32) {}

    /// Steady-state status, throttled to the engine's status interval.
    fn status(&mut self, _status: &Status) {}
}

/// No-op observer for tests and benches.
impl StatusSink for () {}

/// Headless observer printing the status line to stderr.
#[derive(Debug, Default)]
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn calibrated(&mut self, baseline_hz: f32) {
        eprintln!("baseline = {baseline_hz:.2} Hz");
    }

    fn status(&mut self, status: &Status) {
        eprintln!(
            "sensor: {:.1} Hz, Δ={:.1}, audio={:.1} Hz, vol={:.2}",
            status.smoothed_hz, status.delta_hz, status.frequency_hz, status.volume
        );
    }
}

/// The full signal path, generic over its three hardware collaborators so
/// every one of them can be replaced by a scripted double in tests.
pub struct Engine<C, S, K, D> {
    sampler: PeriodSampler<C>,
    tracker: CalibrationTracker,
    voice: ToneVoice,
    player: PacedPlayer<S, K>,
    diagnostics: D,
    buffer: [u8; BUFFER_SIZE],
    status_interval: Duration,
    last_report: Option<Instant>,
}

impl<C, S, K, D> Engine<C, S, K, D>
where
    C: PulseCapture,
    S: ToneSink,
    K: PaceClock,
    D: StatusSink,
{
    pub fn new(capture: C, sink: S, clock: K, diagnostics: D) -> Self {
        Self {
            sampler: PeriodSampler::new(capture),
            tracker: CalibrationTracker::new(),
            voice: ToneVoice::new(),
            player: PacedPlayer::new(sink, clock, SAMPLE_RATE),
            diagnostics,
            buffer: [0; BUFFER_SIZE],
            status_interval: STATUS_INTERVAL,
            last_report: None,
        }
    }

    /// Override the status report throttle. Zero disables throttling, which
    /// is what scripted tests want.
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Run one full iteration: measure, smooth, map, render, play.
    pub fn run_once(&mut self) {
        let reading = self.sampler.measure();
        let accepted = reading.filter(|&f| plausible(f));

        if let Some(baseline) = self.tracker.update(reading) {
            self.diagnostics.calibrated(baseline);
        }

        match self.tracker.phase() {
            TrackerPhase::Calibrating => {
                if self.report_due() {
                    self.diagnostics
                        .calibrating(self.tracker.accepted_readings(), CALIBRATION_SAMPLES);
                }
            }
            TrackerPhase::Steady if accepted.is_none() => {
                // Dropout: the smoothed estimate holds its last value and
                // nothing plays this cycle.
                self.player.idle(DROPOUT_IDLE);
            }
            TrackerPhase::Steady => {
                if let Some((baseline, smoothed)) = self.tracker.steady() {
                    let params = control::map(smoothed, baseline);
                    self.speak(&params);
                    if self.report_due() {
                        self.diagnostics.status(&Status {
                            smoothed_hz: smoothed,
                            delta_hz: (smoothed - baseline).max(0.0),
                            frequency_hz: params.frequency,
                            volume: params.volume,
                        });
                    }
                }
            }
        }
    }

    /// Run iterations until `keep_running` returns false.
    pub fn run_while(&mut self, keep_running: impl Fn() -> bool) {
        while keep_running() {
            self.run_once();
        }
    }

    fn speak(&mut self, params: &ControlParams) {
        // At zero volume the buffer would be all-midpoint silence; skip the
        // render and the output bus activity entirely.
        if params.volume <= 0.0 {
            return;
        }
        self.voice
            .render(&mut self.buffer, params.frequency, params.volume);
        self.player.play(&self.buffer);
    }

    fn report_due(&mut self) -> bool {
        let now = Instant::now();
        match self.last_report {
            Some(last) if now.duration_since(last) < self.status_interval => false,
            _ => {
                self.last_report = Some(now);
                true
            }
        }
    }

    pub fn tracker(&self) -> &CalibrationTracker {
        &self.tracker
    }
}
