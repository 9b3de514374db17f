//! Low-level signal primitives shared by the sensor and synthesis paths.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! use inside the paced output loop. They stay focused on the per-sample math;
//! the `sensor`, `synth`, and `engine` modules layer policy on top.

/// Phase accumulation and sine generation.
pub mod oscillator;
/// Soft saturation and DAC quantization.
pub mod saturation;
/// Exponential moving average filter.
pub mod smoothing;
