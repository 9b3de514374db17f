//! End-to-end control loop tests with scripted hardware doubles.
//!
//! Every collaborator the engine touches - capture peripheral, analog
//! output, pacing clock, diagnostics - is replaced here, so one iteration
//! of the loop is fully observable without real timing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use fieldtone::engine::{Engine, Status, StatusSink};
use fieldtone::io::pacing::PaceClock;
use fieldtone::io::ToneSink;
use fieldtone::sensor::calibration::CALIBRATION_SAMPLES;
use fieldtone::sensor::{PulseCapture, RawTiming};
use fieldtone::BUFFER_SIZE;

/// 160 ticks * 12.5 ns = 2 µs period = 500 kHz.
const BASELINE_EVENT: RawTiming = RawTiming {
    duration0: 80,
    duration1: 80,
};

/// 158 ticks ≈ 506.3 kHz, ~1.27% above baseline - inside the 2% window.
const APPROACH_EVENT: RawTiming = RawTiming {
    duration0: 79,
    duration1: 79,
};

/// 164 ticks ≈ 487.8 kHz - below baseline, must stay silent.
const RECEDE_EVENT: RawTiming = RawTiming {
    duration0: 82,
    duration1: 82,
};

struct ScriptedCapture {
    events: VecDeque<Option<RawTiming>>,
}

impl PulseCapture for ScriptedCapture {
    fn recv_timeout(&mut self, _timeout: Duration) -> Option<RawTiming> {
        self.events.pop_front().flatten()
    }
}

#[derive(Default)]
struct Recorder {
    levels: Vec<u8>,
    waits: Vec<Duration>,
    baseline: Option<f32>,
    statuses: Vec<Status>,
}

#[derive(Clone, Default)]
struct SharedRecorder(Rc<RefCell<Recorder>>);

impl ToneSink for SharedRecorder {
    fn set_level(&mut self, level: u8) {
        self.0.borrow_mut().levels.push(level);
    }
}

impl PaceClock for SharedRecorder {
    fn wait(&mut self, period: Duration) {
        self.0.borrow_mut().waits.push(period);
    }
}

impl StatusSink for SharedRecorder {
    fn calibrated(&mut self, baseline_hz: f32) {
        self.0.borrow_mut().baseline = Some(baseline_hz);
    }

    fn status(&mut self, status: &Status) {
        self.0.borrow_mut().statuses.push(*status);
    }
}

fn engine_with(
    events: Vec<Option<RawTiming>>,
) -> (
    Engine<ScriptedCapture, SharedRecorder, SharedRecorder, SharedRecorder>,
    SharedRecorder,
) {
    let recorder = SharedRecorder::default();
    let engine = Engine::new(
        ScriptedCapture {
            events: events.into(),
        },
        recorder.clone(),
        recorder.clone(),
        recorder.clone(),
    )
    .with_status_interval(Duration::ZERO);
    (engine, recorder)
}

fn calibration_events() -> Vec<Option<RawTiming>> {
    vec![Some(BASELINE_EVENT); CALIBRATION_SAMPLES]
}

#[test]
fn calibration_completes_silently() {
    let (mut engine, recorder) = engine_with(calibration_events());
    for _ in 0..CALIBRATION_SAMPLES {
        engine.run_once();
    }

    let state = recorder.0.borrow();
    let baseline = state.baseline.expect("calibration should have completed");
    assert!((baseline - 500_000.0).abs() < 1.0, "baseline {baseline}");
    // Nothing reaches the output during calibration
    assert!(state.levels.is_empty());
    assert!(state.waits.is_empty());
}

#[test]
fn steady_at_baseline_skips_synthesis() {
    let mut events = calibration_events();
    events.extend(vec![Some(BASELINE_EVENT); 10]);
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..CALIBRATION_SAMPLES + 10 {
        engine.run_once();
    }

    // Zero deviation → volume 0 → no output bus activity at all
    assert!(recorder.0.borrow().levels.is_empty());
}

#[test]
fn approach_produces_one_paced_buffer_per_iteration() {
    let mut events = calibration_events();
    events.push(Some(APPROACH_EVENT));
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..CALIBRATION_SAMPLES + 1 {
        engine.run_once();
    }

    let state = recorder.0.borrow();
    assert_eq!(state.levels.len(), BUFFER_SIZE);
    // One pace wait per emitted sample, at the 22.05 kHz sample period
    assert_eq!(state.waits.len(), BUFFER_SIZE);
    assert!(state
        .waits
        .iter()
        .all(|&w| w == Duration::from_micros(45)));
    // Quantized samples never escape the DAC's representable range
    assert!(state.levels.iter().all(|&s| (8..=248).contains(&s)));
}

#[test]
fn dropout_holds_estimate_and_idles() {
    let mut events = calibration_events();
    events.push(Some(APPROACH_EVENT));
    events.extend(vec![None; 5]);
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..CALIBRATION_SAMPLES + 6 {
        engine.run_once();
    }

    let state = recorder.0.borrow();
    // The approach iteration played one buffer; the dropouts played nothing
    assert_eq!(state.levels.len(), BUFFER_SIZE);
    // Each dropout iteration is a single 10 ms idle wait
    let idle_waits = state
        .waits
        .iter()
        .filter(|&&w| w == Duration::from_millis(10))
        .count();
    assert_eq!(idle_waits, 5);
    // The smoothed estimate is held, not decayed toward baseline
    let smoothed = engine.tracker().smoothed().unwrap();
    assert!(smoothed > 500_000.0);
}

#[test]
fn receding_sensor_is_identical_to_rest() {
    let mut events = calibration_events();
    events.extend(vec![Some(RECEDE_EVENT); 20]);
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..CALIBRATION_SAMPLES + 20 {
        engine.run_once();
    }

    // Below-baseline deviation clamps to zero: silent, like no deviation
    assert!(recorder.0.borrow().levels.is_empty());
}

#[test]
fn glitch_readings_do_not_perturb_the_baseline() {
    // 4 ticks = 50 ns period = 20 MHz, far beyond the 5 MHz sanity bound
    let glitch = RawTiming {
        duration0: 2,
        duration1: 2,
    };
    let mut events = vec![Some(glitch); 50];
    events.extend(calibration_events());
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..50 + CALIBRATION_SAMPLES {
        engine.run_once();
    }

    let baseline = recorder.0.borrow().baseline.expect("should calibrate");
    assert!((baseline - 500_000.0).abs() < 1.0);
}

#[test]
fn status_reports_carry_the_mapped_parameters() {
    let mut events = calibration_events();
    events.push(Some(APPROACH_EVENT));
    let (mut engine, recorder) = engine_with(events);

    for _ in 0..CALIBRATION_SAMPLES + 1 {
        engine.run_once();
    }

    let state = recorder.0.borrow();
    let status = state.statuses.last().expect("steady status expected");
    assert!(status.smoothed_hz > 500_000.0);
    assert!(status.delta_hz > 0.0);
    assert!(status.volume > 0.0 && status.volume <= 1.0);
    assert!((80.0..=1_200.0).contains(&status.frequency_hz));
}
