//! Transport bar widget - shows title, genre chain, play state, position and mixer state

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use remix_studio::engine::SourceStatus;

use super::TrackInfo;

fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn render_transport(frame: &mut Frame, area: Rect, info: &TrackInfo, status: &SourceStatus) {
    let block = Block::default().title(" remix ").borders(Borders::ALL);

    let (symbol, state, color) = if status.finished {
        ("■", "Finished", Color::DarkGray)
    } else if status.playing {
        ("▶", "Playing", Color::Green)
    } else {
        ("⏸", "Paused", Color::Yellow)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", info.title), Style::default().fg(Color::White)),
        Span::styled(
            format!("[{}]  ", info.genre.unwrap_or("dry")),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{symbol} {state}  "), Style::default().fg(color)),
        Span::styled(
            format!("{} / {}  ", clock(status.position), clock(status.duration)),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Vol: {:.0}%{}  ", status.volume * 100.0, if status.muted { " (muted)" } else { "" }),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("{:.1}kHz {}ch", info.sample_rate as f32 / 1000.0, info.channels),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

pub fn render_progress(frame: &mut Frame, area: Rect, status: &SourceStatus) {
    let ratio = if status.duration > 0.0 {
        (status.position / status.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label("");
    frame.render_widget(gauge, area);
}
