//! Output stream setup for `remix play`

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    PlayStreamError,
};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use tracing::{error, warn};

use remix_studio::{
    engine::{start_with_retry, AudioSession, PlaybackDevice, SessionCommand, SourceStatus, ThreadScheduler},
    error::PlaybackError,
    io::decode_file,
    StudioConfig,
};

use super::{
    ui::{TrackInfo, UiApp},
    PlayArgs,
};

const COMMAND_QUEUE: usize = 64;
const STATUS_QUEUE: usize = 256;

/// A built cpal stream, started and stopped through the retry policy.
struct CpalDevice {
    stream: cpal::Stream,
}

impl PlaybackDevice for CpalDevice {
    fn start(&mut self) -> Result<(), PlaybackError> {
        self.stream.play().map_err(|err| match err {
            PlayStreamError::DeviceNotAvailable => PlaybackError::Unsupported,
            other => PlaybackError::Device(other.to_string()),
        })
    }

    fn stop(&mut self) {
        if let Err(err) = self.stream.pause() {
            warn!(error = %err, "failed to pause output stream");
        }
    }
}

pub fn play(config: &StudioConfig, args: &PlayArgs) -> EyreResult<()> {
    let buffer = decode_file(&args.file)
        .wrap_err_with(|| format!("failed to decode {}", args.file.display()))?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;

    let mut session = AudioSession::with_config(config, sample_rate, channels)?;
    let id = session.load(&buffer)?;
    let genre = args
        .genre
        .as_deref()
        .and_then(|name| session.try_attach_genre(id, name));
    let spectrum = if args.no_tap { None } else { session.try_attach_tap(id) };
    session.play(id)?;

    let initial = session
        .status(id)
        .ok_or_else(|| eyre!("source {id} is not loaded"))?;

    let (command_tx, mut command_rx) = RingBuffer::<SessionCommand>::new(COMMAND_QUEUE);
    let (mut status_tx, status_rx) = RingBuffer::<SourceStatus>::new(STATUS_QUEUE);

    let stream = device
        .build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                session.drain(&mut command_rx);
                session.render(data);
                if let Some(status) = session.status(id) {
                    // UI keeps the latest; a full queue just skips a frame.
                    let _ = status_tx.push(status);
                }
            },
            |err| error!(error = %err, "audio stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    let guard = start_with_retry(CpalDevice { stream }, config.retry_policy(), &mut ThreadScheduler)
        .wrap_err("failed to start playback")?;

    let info = TrackInfo {
        title: args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.file.display().to_string()),
        genre: genre.map(|spec| spec.name),
        sample_rate,
        channels,
    };
    let mut app = UiApp::new(id, info, command_tx, status_rx, initial, spectrum);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    drop(guard);
    result
}
