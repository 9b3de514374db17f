//! Pulse-train sensor front end.
//!
//! The proximity sensor is an LC oscillator whose resonant frequency rises as
//! an object approaches. A capture peripheral timestamps its pulse train and
//! hands over one [`RawTiming`] per oscillation; everything in this module
//! turns that noisy stream into a stable frequency estimate.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Baseline averaging and steady-state smoothing state machine.
pub mod calibration;
/// Raw timing event to instantaneous frequency conversion.
pub mod sampler;

/// One capture event: the measured lengths of the two halves of a single
/// oscillation, in hardware tick units. Consumed once, then discarded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTiming {
    pub duration0: u16,
    pub duration1: u16,
}

impl RawTiming {
    /// Total period of the captured oscillation, in ticks.
    #[inline]
    pub fn period_ticks(&self) -> u32 {
        u32::from(self.duration0) + u32::from(self.duration1)
    }
}

/// Bounded-wait source of timing events.
///
/// The capture hardware buffers events internally; this trait exposes the
/// one receive contract the signal path consumes: wait at most `timeout` for
/// the next event, else report that none arrived. Implementations must never
/// block past the timeout - the control loop's worst-case latency depends
/// on it.
pub trait PulseCapture {
    fn recv_timeout(&mut self, timeout: Duration) -> Option<RawTiming>;
}
