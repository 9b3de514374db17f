//! Phase accumulation and sine generation.

/*
Phase Accumulators
==================

Every oscillator in this crate is built on the same primitive: a phase value
in cycles that advances by `frequency * dt` each sample and wraps back into
[0, 1) when it passes 1.0.

Vocabulary
----------

  phase       Position within one waveform cycle, in cycle units.
              0.0 = start of cycle, 0.5 = halfway, wraps before 1.0.

  dt          The sample period in seconds: 1 / sample_rate.
              At 22 050 Hz, dt ≈ 45.35 µs.

  increment   How far the phase moves per sample: frequency * dt.
              A 440 Hz tone at 22 050 Hz advances ~0.02 cycles per sample.

  wrap        Folding the phase back into [0, 1). Wrapping instead of
              resetting keeps the waveform continuous across buffer
              boundaries - the phase left by one buffer is exactly where
              the next buffer picks up.

Cycle units (rather than radians) keep the accumulator small and the wrap a
cheap floor subtraction; the 2π factor is applied only at the point where a
sample is actually taken.
*/

use std::f32::consts::TAU;

/// Advance a cycle-domain phase by one sample and wrap into [0, 1).
///
/// The caller owns the phase and must carry it across buffers unmodified;
/// re-zeroing it between buffers produces an audible click.
#[inline]
pub fn advance_phase(phase: f32, frequency_hz: f32, dt: f32) -> f32 {
    let advanced = phase + frequency_hz * dt;
    advanced - advanced.floor()
}

/// Sample a sine wave at a cycle-domain phase.
#[inline]
pub fn sine(phase: f32) -> f32 {
    (TAU * phase).sin()
}

/// Advance a radian-domain phase at a fixed rate and wrap into [0, 2π).
///
/// Used for the modulation LFOs, which accumulate in radians. Without the
/// wrap an f32 phase loses sample-level precision after hours of runtime.
#[inline]
pub fn advance_radians(phase: f32, frequency_hz: f32, dt: f32) -> f32 {
    (phase + TAU * frequency_hz * dt) % TAU
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 22_050.0;

    #[test]
    fn phase_advances_by_frequency_times_dt() {
        let dt = 1.0 / SAMPLE_RATE;
        let phase = advance_phase(0.0, 440.0, dt);
        assert!((phase - 440.0 * dt).abs() < 1e-7);
    }

    #[test]
    fn phase_wraps_into_unit_interval() {
        let mut phase = 0.95;
        let dt = 1.0 / SAMPLE_RATE;
        for _ in 0..10_000 {
            phase = advance_phase(phase, 1_200.0, dt);
            assert!((0.0..1.0).contains(&phase), "phase {phase} escaped [0, 1)");
        }
    }

    #[test]
    fn sine_matches_reference_series() {
        // sample n of a continuous accumulation should be sin(2π f n / sr)
        let dt = 1.0 / SAMPLE_RATE;
        let frequency = 440.0;
        let mut phase = 0.0;
        for n in 1..=64 {
            phase = advance_phase(phase, frequency, dt);
            let expected = (TAU * frequency * n as f32 / SAMPLE_RATE).sin();
            assert!(
                (sine(phase) - expected).abs() < 1e-4,
                "sample {n}: expected {expected}, got {}",
                sine(phase)
            );
        }
    }

    #[test]
    fn radian_phase_stays_bounded() {
        let mut phase = 0.0;
        let dt = 1.0 / SAMPLE_RATE;
        for _ in 0..100_000 {
            phase = advance_radians(phase, 6.5, dt);
            assert!((0.0..TAU).contains(&phase));
        }
    }
}
