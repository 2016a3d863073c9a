//! Studio-wide settings.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! sample_rate = 48000
//! master_gain = 0.5
//! retry_delay_ms = 250
//! ```

#[cfg(feature = "serde")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    engine::playback::RetryPolicy,
    error::ConfigError,
    spectrum::{DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING},
    synth::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE},
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StudioConfig {
    /// Render and session rate in Hz.
    pub sample_rate: u32,
    /// Length of synthesized clips in seconds.
    pub render_seconds: f64,
    pub fft_size: usize,
    pub smoothing: f32,
    /// Output gain applied after the mixer.
    pub master_gain: f32,
    /// Total start attempts, including the first.
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// Overrides every voice's fallback asset when set.
    pub fallback_asset: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            render_seconds: 4.0,
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            master_gain: 0.7,
            retry_attempts: 2,
            retry_delay_ms: 500,
            fallback_asset: None,
        }
    }
}

impl StudioConfig {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ConfigError::Invalid {
                name: "sample_rate",
                message: format!(
                    "{} Hz is outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}",
                    self.sample_rate
                ),
            });
        }
        if !(self.render_seconds.is_finite() && self.render_seconds > 0.0) {
            return Err(ConfigError::Invalid {
                name: "render_seconds",
                message: format!("{} must be positive", self.render_seconds),
            });
        }
        if !self.fft_size.is_power_of_two() || !(32..=32_768).contains(&self.fft_size) {
            return Err(ConfigError::Invalid {
                name: "fft_size",
                message: format!("{} must be a power of two in 32..=32768", self.fft_size),
            });
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::Invalid {
                name: "smoothing",
                message: format!("{} must be within [0, 1]", self.smoothing),
            });
        }
        if !(self.master_gain.is_finite() && self.master_gain >= 0.0) {
            return Err(ConfigError::Invalid {
                name: "master_gain",
                message: format!("{} must be non-negative", self.master_gain),
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "retry_attempts",
                message: "at least one attempt is required".into(),
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}
