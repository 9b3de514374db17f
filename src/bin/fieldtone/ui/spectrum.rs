//! Spectrum analyzer widget
//!
//! FFT of the output buffer, sampled at log-spaced frequencies so the
//! 80-1200 Hz playing range and its saturation harmonics both stay visible.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of displayed frequency points
const SPECTRUM_BINS: usize = 40;

/// Lowest displayed frequency (Hz)
const MIN_FREQ: f64 = 40.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    /// Hann window coefficients
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin index for each displayed point
    bin_indices: Vec<usize>,
    /// Current display data: (frequency_hz, magnitude_db)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / fft_size as f32;
                0.5 * (1.0 - x.cos())
            })
            .collect();

        // Log-spaced sample points from MIN_FREQ to Nyquist
        let nyquist = f64::from(sample_rate) / 2.0;
        let ratio = nyquist / MIN_FREQ;
        let half = (fft_size / 2).max(1);
        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = (freq * fft_size as f64 / f64::from(sample_rate)).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq, -120.0));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            bin_indices,
            spectrum,
        }
    }

    /// Recompute the spectrum from the latest audio buffer
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for (i, sample) in buffer.iter().enumerate() {
            self.scratch[i] = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index];
            let power = f64::from(bin.re * bin.re + bin.im * bin.im).max(1e-12);
            point.1 = 10.0 * power.log10();
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.iter().map(|(f, _)| *f).fold(1.0, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-100.0, 10.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
