//! TUI module for fieldtone
//!
//! Real-time view of the sensor estimate, the mapped synthesis parameters,
//! and the audio actually leaving the DAC bridge.

pub mod state;

mod readout;
mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use fieldtone::SAMPLE_RATE;

use readout::{render_header, render_readout};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use state::{ControlMessage, UiSnapshot};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// UI application state
pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Ring buffer receiver for engine snapshots
    snapshot_rx: Consumer<UiSnapshot>,
    /// Ring buffer sender for simulator commands
    control_tx: Producer<ControlMessage>,
    /// Latest engine snapshot
    current: UiSnapshot,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    /// FFT view of the audio buffer
    spectrum: SpectrumAnalyzer,
    /// Local echo of the simulated hand position
    proximity: f32,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        snapshot_rx: Consumer<UiSnapshot>,
        control_tx: Producer<ControlMessage>,
    ) -> Self {
        Self {
            audio_rx,
            snapshot_rx,
            control_tx,
            current: UiSnapshot::new(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, SAMPLE_RATE as f32),
            proximity: 0.0,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_snapshots();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Read new audio samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.audio_rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    /// Keep only the latest snapshot
    fn poll_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshot_rx.pop() {
            self.current = snapshot;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => {
                self.proximity = (self.proximity + 0.05).clamp(-0.5, 1.5);
                let _ = self.control_tx.push(ControlMessage::Approach);
            }
            KeyCode::Down => {
                self.proximity = (self.proximity - 0.05).clamp(-0.5, 1.5);
                let _ = self.control_tx.push(ControlMessage::Recede);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header bar
                Constraint::Length(7),  // Sensor readout / calibration
                Constraint::Min(8),     // Waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        render_header(frame, chunks[0], &self.current);
        render_readout(frame, chunks[1], &self.current, self.proximity);
        render_waveform(frame, chunks[2], &self.audio_buffer);
        render_spectrum(frame, chunks[3], self.spectrum.data());

        let help = ratatui::widgets::Paragraph::new(" [↑] Approach  [↓] Recede  [Q] Quit")
            .style(ratatui::style::Style::default().fg(ratatui::style::Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
