//! Deviation-to-parameter mapping.

/*
Parameter Mapper
================

The bridge between the sensor domain (hundreds of kilohertz) and the audio
domain (tens to hundreds of hertz). The whole playable range of the
instrument lives inside a narrow sensitivity window just above the baseline:

    sensor frequency
        │
        │         ┌────────────── clamped: full volume, MAX_AUDIO_FREQ
    B*1.02 ───────┤
        │         │  linear ramp: deviation → pitch and volume together
      B ──────────┤
        │         └────────────── clamped: silent, BASE_AUDIO_FREQ
        │
        ▼

Only positive deviation drives output. The baseline is defined as "no object
present", so a frequency below it carries no proximity information; the delta
is clamped to zero and the instrument stays silent. This asymmetry is
deliberate and load-bearing - do not "fix" it.

The 2% window is calibrated to the dynamic range of the physical sensor: a
hand closing to a few centimeters detunes the LC tank by roughly that much.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Audio frequency produced at zero deviation (Hz).
pub const BASE_AUDIO_FREQ: f32 = 80.0;

/// Audio frequency produced at full deviation (Hz).
pub const MAX_AUDIO_FREQ: f32 = 1_200.0;

/// Fraction of the baseline spanned by the sensitivity window.
pub const SENSITIVITY: f32 = 0.02;

/// Synthesis targets for one control-loop iteration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Target carrier frequency, clamped to [BASE_AUDIO_FREQ, MAX_AUDIO_FREQ].
    pub frequency: f32,
    /// Output volume, clamped to [0, 1]. Zero means "do not synthesize".
    pub volume: f32,
}

/// Map a smoothed sensor frequency and its baseline to synthesis parameters.
///
/// Pure, total over its stated domain. Precondition: `baseline_hz > 0`,
/// guaranteed structurally because the caller only maps once the calibration
/// tracker has reached its steady phase.
pub fn map(smoothed_hz: f32, baseline_hz: f32) -> ControlParams {
    debug_assert!(baseline_hz > 0.0, "mapped before calibration completed");

    let delta_max = baseline_hz * SENSITIVITY;
    let delta = (smoothed_hz - baseline_hz).clamp(0.0, delta_max);
    let norm = delta / delta_max;

    ControlParams {
        frequency: BASE_AUDIO_FREQ + norm * (MAX_AUDIO_FREQ - BASE_AUDIO_FREQ),
        volume: norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_deviation_is_silent_at_base_frequency() {
        let params = map(1_000.0, 1_000.0);
        assert_eq!(params.volume, 0.0);
        assert_eq!(params.frequency, BASE_AUDIO_FREQ);
    }

    #[test]
    fn negative_deviation_matches_no_deviation() {
        let below = map(990.0, 1_000.0);
        let at = map(1_000.0, 1_000.0);
        assert_eq!(below, at);
    }

    #[test]
    fn one_percent_deviation_is_half_scale() {
        // baseline 1000 Hz, smoothed 1010 Hz → norm 0.5
        let params = map(1_010.0, 1_000.0);
        assert!((params.volume - 0.5).abs() < 1e-6);
        // 80 + 0.5 * (1200 - 80) = 640
        assert!((params.frequency - 640.0).abs() < 1e-3);
    }

    #[test]
    fn window_edge_and_beyond_clamp_to_full_scale() {
        let edge = map(1_020.0, 1_000.0);
        assert!((edge.volume - 1.0).abs() < 1e-6);
        assert!((edge.frequency - MAX_AUDIO_FREQ).abs() < 1e-3);

        let far = map(5_000.0, 1_000.0);
        assert_eq!(far.volume, 1.0);
        assert_eq!(far.frequency, MAX_AUDIO_FREQ);
    }

    #[test]
    fn mapping_is_monotonic_across_the_window() {
        let baseline = 500_000.0;
        let mut previous = map(baseline, baseline);
        for step in 1..=100 {
            let smoothed = baseline + baseline * SENSITIVITY * step as f32 / 100.0;
            let params = map(smoothed, baseline);
            assert!(params.frequency >= previous.frequency);
            assert!(params.volume >= previous.volume);
            previous = params;
        }
    }

    #[test]
    fn outputs_stay_inside_their_ranges() {
        let baseline = 500_000.0;
        for smoothed in [0.0, baseline * 0.5, baseline, baseline * 1.01, baseline * 2.0] {
            let params = map(smoothed, baseline);
            assert!((BASE_AUDIO_FREQ..=MAX_AUDIO_FREQ).contains(&params.frequency));
            assert!((0.0..=1.0).contains(&params.volume));
        }
    }
}
