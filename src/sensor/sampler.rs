//! Raw timing event to instantaneous frequency conversion.

use std::time::Duration;

use super::{PulseCapture, RawTiming};

/// Seconds per hardware capture tick (80 MHz peripheral clock, divider 1).
pub const TICK_SECONDS: f32 = 12.5e-9;

/// Bounded wait for one capture event before declaring a dropout.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_millis(10);

/// Converts one timing event per call into an instantaneous frequency.
///
/// Absence of signal is a normal outcome, not an error: a timeout, a
/// zero-length event, or a degenerate period all come back as `None` and the
/// caller skips the cycle. This never panics and never returns 0 or NaN.
pub struct PeriodSampler<C> {
    capture: C,
}

impl<C: PulseCapture> PeriodSampler<C> {
    pub fn new(capture: C) -> Self {
        Self { capture }
    }

    /// Pull at most one event from the peripheral and derive its frequency.
    ///
    /// Side effect: drains one event from the capture queue.
    pub fn measure(&mut self) -> Option<f32> {
        let event = self.capture.recv_timeout(CAPTURE_TIMEOUT)?;
        frequency_of(event)
    }
}

/// Frequency of a single timing event, if it describes a usable period.
#[inline]
pub fn frequency_of(event: RawTiming) -> Option<f32> {
    let ticks = event.period_ticks();
    if ticks == 0 {
        return None;
    }
    let period = ticks as f32 * TICK_SECONDS;
    if period <= 0.0 {
        return None;
    }
    Some(1.0 / period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Capture backed by a script of events; `None` entries model timeouts.
    struct ScriptedCapture {
        events: VecDeque<Option<RawTiming>>,
    }

    impl ScriptedCapture {
        fn new(events: Vec<Option<RawTiming>>) -> Self {
            Self {
                events: events.into(),
            }
        }
    }

    impl PulseCapture for ScriptedCapture {
        fn recv_timeout(&mut self, _timeout: Duration) -> Option<RawTiming> {
            self.events.pop_front().flatten()
        }
    }

    #[test]
    fn frequency_is_reciprocal_of_period() {
        let event = RawTiming {
            duration0: 80,
            duration1: 80,
        };
        // 160 ticks * 12.5 ns = 2 µs period = 500 kHz
        let f = frequency_of(event).unwrap();
        assert!((f - 500_000.0).abs() < 1.0, "got {f}");
    }

    #[test]
    fn asymmetric_duty_cycle_uses_total_period() {
        let symmetric = frequency_of(RawTiming {
            duration0: 80,
            duration1: 80,
        })
        .unwrap();
        let skewed = frequency_of(RawTiming {
            duration0: 30,
            duration1: 130,
        })
        .unwrap();
        assert!((symmetric - skewed).abs() < 1e-3);
    }

    #[test]
    fn zero_length_event_is_invalid() {
        assert_eq!(
            frequency_of(RawTiming {
                duration0: 0,
                duration1: 0,
            }),
            None
        );
    }

    #[test]
    fn max_duration_event_does_not_overflow() {
        let event = RawTiming {
            duration0: u16::MAX,
            duration1: u16::MAX,
        };
        let f = frequency_of(event).unwrap();
        assert!(f.is_finite() && f > 0.0);
    }

    #[test]
    fn timeout_yields_no_reading() {
        let mut sampler = PeriodSampler::new(ScriptedCapture::new(vec![None]));
        assert_eq!(sampler.measure(), None);
    }

    #[test]
    fn measure_drains_one_event_per_call() {
        let mut sampler = PeriodSampler::new(ScriptedCapture::new(vec![
            Some(RawTiming {
                duration0: 80,
                duration1: 80,
            }),
            None,
        ]));
        assert!(sampler.measure().is_some());
        assert_eq!(sampler.measure(), None);
    }

    #[test]
    fn valid_readings_are_always_positive() {
        for ticks in [1u16, 2, 100, 40_000] {
            let f = frequency_of(RawTiming {
                duration0: ticks,
                duration1: 0,
            })
            .unwrap();
            assert!(f > 0.0);
        }
    }
}
