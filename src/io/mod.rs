// Purpose - external output interfaces and sample-rate pacing

/// Fixed-rate emission of rendered buffers.
pub mod pacing;

/// Analog output collaborator: set the DAC to one quantized level.
///
/// Enabling and calibrating the converter hardware happens elsewhere; the
/// signal path only ever drives this one operation.
pub trait ToneSink {
    fn set_level(&mut self, level: u8);
}
