//! Fixed-rate emission of rendered buffers.
//!
//! The synthesizer is the only component with a hard timing obligation: one
//! sample must reach the DAC every 1/22 050 s, and any stall here is audible
//! distortion. Pacing is a deliberately blocking busy/delay loop - the
//! control loop interleaves "listen" (sensor poll) and "speak" (this loop)
//! phases rather than running them concurrently.
//!
//! The suspension point is behind the [`PaceClock`] trait so tests can count
//! waits instead of sleeping through them.

use std::time::{Duration, Instant};

use super::ToneSink;

/// Bounded blocking wait between samples.
pub trait PaceClock {
    /// Block the caller for `period` from now.
    fn wait(&mut self, period: Duration);
}

/// Busy-spin pacing against the monotonic clock.
///
/// Sample periods (~45 µs) sit far below OS sleep granularity, so the wait
/// spins. This burns a core during playback, which is the accepted cost of
/// jitter-free emission on a general-purpose host.
#[derive(Debug, Default)]
pub struct SpinClock;

impl SpinClock {
    pub fn new() -> Self {
        Self
    }
}

impl PaceClock for SpinClock {
    fn wait(&mut self, period: Duration) {
        let deadline = Instant::now() + period;
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Plays rendered buffers through a sink, one sample per period.
pub struct PacedPlayer<S, C> {
    sink: S,
    clock: C,
    period: Duration,
}

impl<S: ToneSink, C: PaceClock> PacedPlayer<S, C> {
    /// `sample_rate` in Hz; the per-sample period is 1e6 / rate microseconds.
    pub fn new(sink: S, clock: C, sample_rate: u32) -> Self {
        Self {
            sink,
            clock,
            period: Duration::from_micros(u64::from(1_000_000 / sample_rate)),
        }
    }

    /// Emit every sample in order, pacing each one to the sample rate.
    pub fn play(&mut self, buffer: &[u8]) {
        for &level in buffer {
            self.sink.set_level(level);
            self.clock.wait(self.period);
        }
    }

    /// Block without emitting - used by the control loop between cycles
    /// when the sensor produced nothing to play.
    pub fn idle(&mut self, duration: Duration) {
        self.clock.wait(duration);
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
