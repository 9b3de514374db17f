//! Baseline averaging and steady-state smoothing state machine.

/*
Calibration Tracker
===================

Raw single-sample frequency off the sensor is extremely noisy: the
oscillator's duty cycle wanders and the capture peripheral quantizes every
edge to a 12.5 ns grid. Two different filters deal with this at two
different times, and a small state machine governs which one is active.

Vocabulary
----------

  baseline    The resting frequency meaning "no object near the sensor".
              Computed once at startup as the mean of many readings, then
              frozen for the rest of the run.

  smoothed    The live frequency estimate, an EMA of accepted readings.
              This is the control signal everything downstream consumes.

  plausible   A reading inside the sanity window (0, 5 MHz). The peripheral
              occasionally reports glitch periods that work out to absurd
              frequencies; those are discarded before they can perturb
              either filter.

  dropout     No usable reading this cycle. The smoothed estimate holds its
              last value - a sensor that goes quiet for an instant must not
              sound like the player snapped back to the baseline.


The State Machine
-----------------

    ┌─────────────┐   200 accepted readings    ┌────────┐
    │ Calibrating │ ─────────────────────────→ │ Steady │ ──┐
    └─────────────┘   baseline = sum / count   └────────┘   │ EMA update
           │                                        ↑       │ per reading
           │ accumulate sum/count                   └───────┘
           └──── (implausible readings skipped)

One-way: there is no path back to Calibrating, and the baseline never
changes after the transition. On transition the smoothed estimate is seeded
with the baseline itself, so the first mapped deviation is exactly zero.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::smoothing::Ema;

/// Number of accepted readings averaged into the baseline.
pub const CALIBRATION_SAMPLES: usize = 200;

/// EMA coefficient for the steady-state frequency estimate.
pub const SMOOTHING: f32 = 0.05;

/// Upper sanity bound on a plausible sensor frequency (Hz).
pub const MAX_PLAUSIBLE_HZ: f32 = 5.0e6;

/// Which half of the tracker's life it is in. One-way.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Calibrating,
    Steady,
}

enum State {
    Calibrating {
        sum: f64,
        count: usize,
    },
    Steady {
        baseline: f32, // immutable once set
        smoothed: Ema,
    },
}

/// Reject readings the physical sensor cannot have produced.
#[inline]
pub fn plausible(frequency_hz: f32) -> bool {
    frequency_hz > 0.0 && frequency_hz < MAX_PLAUSIBLE_HZ
}

/// Two-phase frequency tracker: average a baseline, then smooth forever.
pub struct CalibrationTracker {
    state: State,
}

impl CalibrationTracker {
    pub fn new() -> Self {
        Self {
            state: State::Calibrating { sum: 0.0, count: 0 },
        }
    }

    /// Feed one sampler result (`None` = no reading this cycle).
    ///
    /// Returns the freshly computed baseline on the Calibrating → Steady
    /// transition, `None` on every other call.
    pub fn update(&mut self, reading: Option<f32>) -> Option<f32> {
        let f = match reading.filter(|&f| plausible(f)) {
            Some(f) => f,
            None => return None, // dropout or glitch: hold everything
        };

        match &mut self.state {
            State::Calibrating { sum, count } => {
                *sum += f64::from(f);
                *count += 1;
                if *count < CALIBRATION_SAMPLES {
                    return None;
                }
                let baseline = (*sum / *count as f64) as f32;
                self.state = State::Steady {
                    baseline,
                    smoothed: Ema::new(SMOOTHING, baseline),
                };
                Some(baseline)
            }
            State::Steady { smoothed, .. } => {
                smoothed.update(f);
                None
            }
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        match self.state {
            State::Calibrating { .. } => TrackerPhase::Calibrating,
            State::Steady { .. } => TrackerPhase::Steady,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.phase() == TrackerPhase::Steady
    }

    /// Calibration progress in [0, 1]. Saturates at 1 once steady.
    pub fn progress(&self) -> f32 {
        self.accepted_readings() as f32 / CALIBRATION_SAMPLES as f32
    }

    /// Readings accepted so far. Saturates at the target once steady.
    pub fn accepted_readings(&self) -> usize {
        match self.state {
            State::Calibrating { count, .. } => count,
            State::Steady { .. } => CALIBRATION_SAMPLES,
        }
    }

    /// The frozen baseline, once calibrated.
    pub fn baseline(&self) -> Option<f32> {
        match self.state {
            State::Calibrating { .. } => None,
            State::Steady { baseline, .. } => Some(baseline),
        }
    }

    /// The live smoothed estimate, once calibrated.
    pub fn smoothed(&self) -> Option<f32> {
        match &self.state {
            State::Calibrating { .. } => None,
            State::Steady { smoothed, .. } => Some(smoothed.value()),
        }
    }

    /// Both control inputs at once, only available in the steady phase.
    pub fn steady(&self) -> Option<(f32, f32)> {
        match &self.state {
            State::Calibrating { .. } => None,
            State::Steady { baseline, smoothed } => Some((*baseline, smoothed.value())),
        }
    }
}

impl Default for CalibrationTracker {
    fn default() -> Self {
        Self::new()
    }
}
