//! TUI for `remix play`
//!
//! Shows transport state and the spectrum of the playing source, and turns
//! keys into session commands for the audio thread.

mod spectrum;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use remix_studio::{
    engine::{SessionCommand, SourceId, SourceStatus},
    spectrum::{bars_from_bins, synthetic_bars, SpectrumHandle, SYNTHETIC_BARS},
};

use spectrum::render_spectrum;
use transport::{render_progress, render_transport};

/// Seconds moved by the arrow keys.
const SEEK_STEP: f64 = 5.0;
const VOLUME_STEP: f32 = 0.1;

/// Static facts about what is playing.
pub struct TrackInfo {
    pub title: String,
    pub genre: Option<&'static str>,
    pub sample_rate: u32,
    pub channels: usize,
}

pub struct UiApp {
    source: SourceId,
    info: TrackInfo,
    /// Commands for the audio thread
    commands: Producer<SessionCommand>,
    /// Status snapshots from the audio thread
    status_rx: Consumer<SourceStatus>,
    status: SourceStatus,
    spectrum: Option<SpectrumHandle>,
    bins: Vec<u8>,
    bars: Vec<u8>,
    started: Instant,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        source: SourceId,
        info: TrackInfo,
        commands: Producer<SessionCommand>,
        status_rx: Consumer<SourceStatus>,
        initial: SourceStatus,
        spectrum: Option<SpectrumHandle>,
    ) -> Self {
        let bins = vec![0; spectrum.as_ref().map_or(0, SpectrumHandle::bin_count)];
        Self {
            source,
            info,
            commands,
            status_rx,
            status: initial,
            spectrum,
            bins,
            bars: vec![0; SYNTHETIC_BARS],
            started: Instant::now(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_status();
            self.update_bars();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
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

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn update_bars(&mut self) {
        match &self.spectrum {
            Some(handle) if handle.is_live() => {
                handle.read_into(&mut self.bins);
                self.bars = bars_from_bins(&self.bins, SYNTHETIC_BARS);
            }
            _ => {
                self.bars = synthetic_bars(SYNTHETIC_BARS, self.started.elapsed().as_secs_f64());
            }
        }
    }

    fn send(&mut self, command: SessionCommand) {
        // A full queue means the audio thread is stalled; dropping a key press is fine.
        let _ = self.commands.push(command);
    }

    fn handle_key(&mut self, key: KeyCode) {
        let source = self.source;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.send(SessionCommand::TogglePause(source)),
            KeyCode::Char('m') | KeyCode::Char('M') => self.send(SessionCommand::ToggleMute(source)),
            KeyCode::Char('r') | KeyCode::Char('R') => self.send(SessionCommand::Restart(source)),
            KeyCode::Left => self.send(SessionCommand::SeekBy {
                source,
                seconds: -SEEK_STEP,
            }),
            KeyCode::Right => self.send(SessionCommand::SeekBy {
                source,
                seconds: SEEK_STEP,
            }),
            KeyCode::Up => self.send(SessionCommand::SetVolume {
                source,
                volume: self.status.volume + VOLUME_STEP,
            }),
            KeyCode::Down => self.send(SessionCommand::SetVolume {
                source,
                volume: (self.status.volume - VOLUME_STEP).max(0.0),
            }),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, progress, spectrum, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(1), // Progress
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.info, &self.status);
        render_progress(frame, chunks[1], &self.status);
        render_spectrum(frame, chunks[2], &self.bars, self.spectrum.is_some());

        let help = Paragraph::new(" [Q] Quit  [Space] Play/Pause  [M] Mute  [R] Restart  [←/→] Seek  [↑/↓] Volume")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
