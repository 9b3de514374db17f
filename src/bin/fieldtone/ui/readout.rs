//! Header bar and sensor readout widgets

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::state::UiSnapshot;

/// Render the header bar - mode and the frozen baseline
pub fn render_header(frame: &mut Frame, area: Rect, snapshot: &UiSnapshot) {
    let block = Block::default().title(" fieldtone ").borders(Borders::ALL);

    let (mode, mode_color) = if snapshot.calibrating {
        ("Calibrating", Color::Yellow)
    } else if snapshot.volume > 0.0 {
        ("Playing", Color::Green)
    } else {
        ("Silent", Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {mode}  "), Style::default().fg(mode_color)),
        Span::styled(
            if snapshot.calibrating {
                "baseline: ---".to_string()
            } else {
                format!("baseline: {:.1} Hz", snapshot.baseline_hz)
            },
            Style::default().fg(Color::Cyan),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the live numbers, or the calibration gauge while averaging
pub fn render_readout(frame: &mut Frame, area: Rect, snapshot: &UiSnapshot, proximity: f32) {
    let block = Block::default().title(" Sensor ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if snapshot.calibrating {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow))
            .ratio(f64::from(snapshot.progress.clamp(0.0, 1.0)))
            .label(format!(
                "averaging baseline... {:.0}%",
                snapshot.progress * 100.0
            ));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(gauge, rows[1]);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // smoothed + delta
            Constraint::Length(1), // audio frequency
            Constraint::Length(1), // hand position
            Constraint::Length(1), // volume gauge
        ])
        .split(inner);

    let sensor_line = Line::from(vec![
        Span::styled(
            format!(" sensor: {:.1} Hz  ", snapshot.smoothed_hz),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Δ +{:.1} Hz", snapshot.delta_hz),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    frame.render_widget(Paragraph::new(sensor_line), rows[0]);

    let audio_line = Line::from(Span::styled(
        format!(" tone: {:.1} Hz", snapshot.audio_hz),
        Style::default().fg(Color::Green),
    ));
    frame.render_widget(Paragraph::new(audio_line), rows[1]);

    let hand_line = Line::from(Span::styled(
        format!(" hand: {:+.2}", proximity),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hand_line), rows[2]);

    let volume = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(f64::from(snapshot.volume.clamp(0.0, 1.0)))
        .label(format!("vol {:.2}", snapshot.volume));
    frame.render_widget(volume, rows[3]);
}
