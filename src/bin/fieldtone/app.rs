//! Fieldtone - application builder and runner
//!
//! Wires the engine to host stand-ins for its three hardware collaborators:
//! the simulated sensor feeds a pulse ring, a cpal output stream drains the
//! DAC ring, and the terminal UI consumes status snapshots. The engine
//! itself never learns it is not on the bench hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use fieldtone::engine::{Engine, Status, StatusSink};
use fieldtone::io::pacing::SpinClock;
use fieldtone::io::ToneSink;
use fieldtone::sensor::{PulseCapture, RawTiming};
use fieldtone::SAMPLE_RATE;

use super::sim::SensorSim;
use super::ui::state::{ControlMessage, UiSnapshot};
use super::ui::UiApp;

/// Main application builder
pub struct Fieldtone {
    sensor_hz: f32,
}

impl Fieldtone {
    pub fn new() -> Self {
        Self {
            sensor_hz: 520_000.0,
        }
    }

    /// Resting frequency of the simulated LC oscillator.
    pub fn sensor_frequency(mut self, hz: f32) -> Self {
        self.sensor_hz = hz;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        // Rings between the four threads of the host harness
        let (pulse_tx, pulse_rx) = RingBuffer::<RawTiming>::new(64);
        let (dac_tx, dac_rx) = RingBuffer::<u8>::new(8192);
        let (vis_tx, vis_rx) = RingBuffer::<f32>::new(4096);
        let (snapshot_tx, snapshot_rx) = RingBuffer::<UiSnapshot>::new(64);
        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(64);

        let stop = Arc::new(AtomicBool::new(false));

        // Host audio output
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let device_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut bridge = DacBridge::new(dac_rx, vis_tx, device_rate);
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| bridge.fill(data, channels),
                |err| eprintln!("audio error: {err}"),
                None,
            )
            .wrap_err("failed to open output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        // Simulated sensor thread
        let sim_stop = stop.clone();
        let sensor_hz = self.sensor_hz;
        let sim_handle = thread::spawn(move || {
            sensor_thread(SensorSim::new(sensor_hz), pulse_tx, control_rx, sim_stop)
        });

        // Engine thread - the real signal path
        let engine_stop = stop.clone();
        let engine_handle = thread::spawn(move || {
            let mut engine = Engine::new(
                RingCapture { events: pulse_rx },
                RingSink { levels: dac_tx },
                SpinClock::new(),
                SnapshotStatus {
                    updates: snapshot_tx,
                    baseline_hz: 0.0,
                },
            );
            engine.run_while(|| !engine_stop.load(Ordering::Relaxed));
        });

        // Terminal UI on the main thread
        let mut terminal = ratatui::init();
        let mut ui = UiApp::new(vis_rx, snapshot_rx, control_tx);
        let result = ui.run(&mut terminal);
        ratatui::restore();

        stop.store(true, Ordering::Relaxed);
        let _ = sim_handle.join();
        let _ = engine_handle.join();
        drop(stream);

        result
    }
}

impl Default for Fieldtone {
    fn default() -> Self {
        Self::new()
    }
}

fn sensor_thread(
    mut sim: SensorSim,
    mut pulses: Producer<RawTiming>,
    mut control: Consumer<ControlMessage>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        while let Ok(message) = control.pop() {
            match message {
                ControlMessage::Approach => sim.nudge(0.05),
                ControlMessage::Recede => sim.nudge(-0.05),
            }
        }
        // Full ring just means the engine is mid-buffer; drop and move on,
        // like the hardware ring overwriting stale captures
        let _ = pulses.push(sim.next_event());
        thread::sleep(Duration::from_micros(500));
    }
}

/// Capture peripheral over the simulator's pulse ring.
struct RingCapture {
    events: Consumer<RawTiming>,
}

impl PulseCapture for RingCapture {
    fn recv_timeout(&mut self, timeout: Duration) -> Option<RawTiming> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(event) = self.events.pop() {
                return Some(event);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_micros(200));
        }
    }
}

/// DAC stand-in: forwards quantized levels to the audio bridge ring.
struct RingSink {
    levels: Producer<u8>,
}

impl ToneSink for RingSink {
    fn set_level(&mut self, level: u8) {
        // The device stream draining this ring is the true pacemaker; block
        // briefly on a full ring, then drop rather than wedge the loop if
        // the stream has died.
        let mut value = level;
        for _ in 0..2_000 {
            match self.levels.push(value) {
                Ok(()) => return,
                Err(rtrb::PushError::Full(rejected)) => {
                    value = rejected;
                    thread::sleep(Duration::from_micros(100));
                }
            }
        }
    }
}

/// Status observer feeding the UI snapshot ring. Best-effort: a full ring
/// drops the update, never blocks the engine.
struct SnapshotStatus {
    updates: Producer<UiSnapshot>,
    baseline_hz: f32,
}

impl StatusSink for SnapshotStatus {
    fn calibrating(&mut self, accepted: usize, target: usize) {
        let _ = self.updates.push(UiSnapshot {
            calibrating: true,
            progress: accepted as f32 / target as f32,
            ..UiSnapshot::new()
        });
    }

    fn calibrated(&mut self, baseline_hz: f32) {
        self.baseline_hz = baseline_hz;
    }

    fn status(&mut self, status: &Status) {
        let _ = self.updates.push(UiSnapshot {
            calibrating: false,
            progress: 1.0,
            baseline_hz: self.baseline_hz,
            smoothed_hz: status.smoothed_hz,
            delta_hz: status.delta_hz,
            audio_hz: status.frequency_hz,
            volume: status.volume,
        });
    }
}

/// Zero-order-hold rate converter from the synthesis rate to the device
/// rate, with a gentle decay to silence when the engine has nothing to say.
struct DacBridge {
    levels: Consumer<u8>,
    vis: Producer<f32>,
    step: f32,
    accumulator: f32,
    held: f32,
}

impl DacBridge {
    fn new(levels: Consumer<u8>, vis: Producer<f32>, device_rate: f32) -> Self {
        Self {
            levels,
            vis,
            step: SAMPLE_RATE as f32 / device_rate,
            accumulator: 0.0,
            held: 0.0,
        }
    }

    fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels) {
            self.accumulator += self.step;
            while self.accumulator >= 1.0 {
                self.accumulator -= 1.0;
                match self.levels.pop() {
                    Ok(level) => self.held = (f32::from(level) - 128.0) / 128.0,
                    // Underrun or intentional silence: fade out the held
                    // level instead of leaving DC on the line
                    Err(_) => self.held *= 0.995,
                }
            }
            for out in frame.iter_mut() {
                *out = self.held;
            }
            let _ = self.vis.push(self.held);
        }
    }
}
