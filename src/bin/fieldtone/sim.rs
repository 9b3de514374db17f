//! Simulated LC oscillator sensor.
//!
//! Stands in for the capture peripheral on a development host: produces the
//! same `RawTiming` events the hardware would, for an oscillator whose
//! frequency rises as a simulated hand approaches. Two noise sources mimic
//! the real front end - duty-cycle wander and the tick-grid quantization of
//! every captured edge.

use fieldtone::control::SENSITIVITY;
use fieldtone::sensor::sampler::TICK_SECONDS;
use fieldtone::sensor::RawTiming;

/// Proximity of 1.0 detunes the oscillator by exactly the sensitivity
/// window, so the full playable range maps onto [0, 1].
const FULL_SCALE_DETUNE: f32 = SENSITIVITY;

/// How quickly the simulated hand glides toward its target position.
const GLIDE: f32 = 0.02;

pub struct SensorSim {
    base_frequency_hz: f32,
    proximity: f32,
    target: f32,
    rng: XorShift32,
}

impl SensorSim {
    pub fn new(base_frequency_hz: f32) -> Self {
        Self {
            base_frequency_hz,
            proximity: 0.0,
            target: 0.0,
            rng: XorShift32::new(0x1234_5678),
        }
    }

    /// Move the simulated hand. Negative values pull away below baseline,
    /// values above 1.0 overdrive into the mapper's clamp region.
    pub fn nudge(&mut self, delta: f32) {
        self.target = (self.target + delta).clamp(-0.5, 1.5);
    }

    /// Produce the next capture event.
    pub fn next_event(&mut self) -> RawTiming {
        self.proximity += (self.target - self.proximity) * GLIDE;

        let frequency = self.base_frequency_hz * (1.0 + self.proximity * FULL_SCALE_DETUNE);
        let period_ticks = 1.0 / (frequency * TICK_SECONDS);

        // Duty-cycle wander and ±1 tick edge quantization
        let duty = 0.5 + (self.rng.next_f32() - 0.5) * 0.1;
        let jitter = (self.rng.next_f32() - 0.5) * 2.0;
        let total = (period_ticks + jitter).round().max(2.0);
        let duration0 = (total * duty).round().clamp(1.0, total - 1.0);

        RawTiming {
            duration0: duration0 as u16,
            duration1: (total - duration0) as u16,
        }
    }
}

/// Small xorshift PRNG - no crate needed for jitter this crude.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}
