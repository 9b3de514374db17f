//! Soft saturation and DAC quantization.
//!
//! The output stage pushes each sample through a tanh waveshaper before
//! quantizing it for the 8-bit DAC. The shaper does two jobs at once: it
//! scales loudness (the drive term includes the volume), and it compresses
//! peaks smoothly, adding harmonic content as the volume rises instead of
//! clipping harshly.
//!
//! # Drive values
//!
//!   0.0        Silence (tanh(0) = 0)
//!   ~0.5-1.0   Mostly linear, clean tone
//!   2-3        Noticeable warmth and compression
//!   5+         Heavy saturation, square-ish
//!
//! tanh is bounded in (-1, 1) for any finite input, so the quantized result
//! is in range no matter how large the drive gets.

/// Soft-saturate a sample through tanh.
///
/// `gain` is the combined drive: typically `volume * DRIVE_GAIN`.
#[inline]
pub fn tanh_drive(sample: f32, gain: f32) -> f32 {
    (sample * gain).tanh()
}

/// Quantize a [-1, 1] sample to the DAC's unsigned 8-bit range.
///
/// `midpoint` is the code for silence and `scale` the swing around it;
/// 128 ± 120 keeps a small guard band at both rails.
#[inline]
pub fn quantize_u8(sample: f32, midpoint: f32, scale: f32) -> u8 {
    (midpoint + sample * scale) as u8
}
