//! Error types shared across the studio.
//!
//! Each stage owns a small error enum so callers can tell the recoverable
//! failures (encoder, live graph, playback) from the ones that must reach the
//! top-level generate call. `StudioError` wraps them all for code that just
//! wants to bubble something up.

use thiserror::Error;

use crate::engine::session::SourceId;

/// Result alias for the umbrella error.
pub type StudioResult<T> = Result<T, StudioError>;

/// Invalid buffer shapes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BufferError {
    #[error("a sample buffer needs at least one channel")]
    NoChannels,

    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    #[error("channel {channel} has {found} frames, expected {expected}")]
    MismatchedChannels {
        channel: usize,
        expected: usize,
        found: usize,
    },
}

/// The audio subsystem cannot be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("audio output not supported: {reason}")]
    Unsupported { reason: String },

    #[error("audio session is closed")]
    Closed,

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Pattern synthesis could not produce a buffer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("unsupported sample rate: {rate} Hz")]
    UnsupportedSampleRate { rate: u32 },

    #[error("invalid render duration: {seconds} seconds")]
    InvalidDuration { seconds: f64 },

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// The PCM container could not be written.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    #[error("too many channels for a WAV header: {channels}")]
    TooManyChannels { channels: usize },

    #[error("PCM payload of {bytes} bytes does not fit a RIFF chunk")]
    TooLarge { bytes: u64 },

    #[error("byte rate overflows for {sample_rate} Hz x {block_align} bytes")]
    ByteRateOverflow { sample_rate: u32, block_align: u16 },
}

/// A user-supplied file could not be read as audio.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("WAV decode failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Live-graph wiring failures. These are contained at the attachment
/// boundary: callers log them and keep playing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("unknown source {0}")]
    UnknownSource(SourceId),

    #[error("source {0} already has an effect chain attached")]
    AlreadyAttached(SourceId),

    #[error("source {0} already has a spectrum tap")]
    AlreadyTapped(SourceId),

    #[error("spectrum tap is no longer available for source {0}")]
    TapUnavailable(SourceId),

    #[error("source {0} is already disconnected")]
    Disconnected(SourceId),
}

/// Starting playback on an output device failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("playback was blocked until the user interacts")]
    NotAllowed,

    #[error("output device is busy")]
    DeviceBusy,

    #[error("output device error: {0}")]
    Device(String),

    #[error("no output device available")]
    Unsupported,
}

impl PlaybackError {
    /// Whether a delayed retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PlaybackError::Unsupported)
    }
}

/// Errors from the generate operation that are not covered by the fallback
/// asset.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value '{name}': {message}")]
    Invalid { name: &'static str, message: String },
}

/// Umbrella error for callers that do not care which stage failed.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_errors_name_the_source() {
        let err = GraphError::AlreadyTapped(SourceId(3));
        assert!(err.to_string().contains("source 3"));
    }

    #[test]
    fn unsupported_device_is_not_retried() {
        assert!(!PlaybackError::Unsupported.is_retryable());
        assert!(PlaybackError::NotAllowed.is_retryable());
        assert!(PlaybackError::DeviceBusy.is_retryable());
    }

    #[test]
    fn umbrella_wraps_stage_errors() {
        let err: StudioError = SynthesisError::UnsupportedSampleRate { rate: 10 }.into();
        assert!(err.to_string().contains("10 Hz"));
    }
}
