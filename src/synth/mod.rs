//! FM tone voice.

/*
Tone Voice
==========

A single monophonic voice: a sine carrier whose instantaneous frequency is
wobbled by two slow LFOs, pushed through a tanh waveshaper, and quantized
for an 8-bit DAC.

Per sample, at dt = 1 / 22 050 s:

  1. fm     = sin(lfo1) * 0.06 + sin(lfo2) * 0.1
  2. f      = frequency * (1 + fm)
  3. phase += f * dt                (wrapped into [0, 1))
  4. s      = sin(2π * phase)
  5. s      = tanh(s * volume * 2.5)
  6. out    = 128 + s * 120         (u8, always inside [8, 248])

The 6.5 Hz LFO is a classic vibrato rate; the 0.5 Hz one adds a slow
chorus-like drift underneath it. Together they turn a sterile sine into
something closer to a singing tone. The tanh stage scales loudness and, at
higher volumes, compresses the peaks into gentle harmonic saturation - a
deliberate nonlinearity, not an accident.

Phase continuity is the one hard invariant here: all three phases live in
the voice and survive across `render` calls. Rendering 256 samples in one
call or in two 128-sample calls must produce identical output; resetting
any phase at a buffer boundary shows up as a click at the buffer rate.
*/

use crate::dsp::{oscillator, saturation};
use crate::SAMPLE_RATE;

/// Vibrato LFO rate (Hz) and modulation depth.
const LFO1_RATE: f32 = 6.5;
const LFO1_DEPTH: f32 = 0.06;

/// Slow drift LFO rate (Hz) and modulation depth.
const LFO2_RATE: f32 = 0.5;
const LFO2_DEPTH: f32 = 0.1;

/// Waveshaper input gain at full volume.
const DRIVE_GAIN: f32 = 2.5;

/// DAC code for silence and the swing around it.
const DAC_MIDPOINT: f32 = 128.0;
const DAC_SCALE: f32 = 120.0;

/// Monophonic FM voice with persistent carrier and LFO phases.
pub struct ToneVoice {
    phase: f32, // carrier, cycles in [0, 1)
    lfo1: f32,  // radians
    lfo2: f32,  // radians
}

impl ToneVoice {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            lfo1: 0.0,
            lfo2: 0.0,
        }
    }

    /// Render one buffer of quantized samples at the given targets.
    ///
    /// `volume` above 1.0 only drives the waveshaper harder; the output
    /// range is bounded regardless.
    pub fn render(&mut self, out: &mut [u8], frequency_hz: f32, volume: f32) {
        let dt = 1.0 / SAMPLE_RATE as f32;

        for sample in out.iter_mut() {
            let fm = self.lfo1.sin() * LFO1_DEPTH + self.lfo2.sin() * LFO2_DEPTH;
            self.lfo1 = oscillator::advance_radians(self.lfo1, LFO1_RATE, dt);
            self.lfo2 = oscillator::advance_radians(self.lfo2, LFO2_RATE, dt);

            let f = frequency_hz * (1.0 + fm);
            self.phase = oscillator::advance_phase(self.phase, f, dt);

            let s = oscillator::sine(self.phase);
            let s = saturation::tanh_drive(s, volume * DRIVE_GAIN);
            *sample = saturation::quantize_u8(s, DAC_MIDPOINT, DAC_SCALE);
        }
    }

    /// Current carrier phase in cycles. Observability for continuity checks.
    pub fn carrier_phase(&self) -> f32 {
        self.phase
    }
}

impl Default for ToneVoice {
    fn default() -> Self {
        Self::new()
    }
}
