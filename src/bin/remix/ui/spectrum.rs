//! Spectrum bars widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

const BAR_GAP: u16 = 1;

/// Render one bar per level. `live` marks analyser data as opposed to the
/// synthetic stand-in.
pub fn render_spectrum(frame: &mut Frame, area: Rect, levels: &[u8], live: bool) {
    let title = if live { " Spectrum " } else { " Spectrum (synthetic) " };
    let block = Block::default().title(title).borders(Borders::ALL);

    let count = levels.len().max(1) as u16;
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width.saturating_sub(BAR_GAP * (count - 1)) / count).max(1);

    let bars: Vec<Bar> = levels
        .iter()
        .map(|&level| Bar::default().value(u64::from(level)).text_value(String::new()))
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(BAR_GAP)
        .max(u64::from(u8::MAX))
        .bar_style(Style::default().fg(if live { Color::Green } else { Color::DarkGray }));

    frame.render_widget(chart, area);
}
