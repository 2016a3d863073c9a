//! Single-oscillator preview tone.
//!
//! A quick stand-in for the full pattern render: one randomly chosen
//! waveform at the prompt's base pitch, held for four beats of the detected
//! tempo with short linear ramps at both ends.

use rand::Rng;
use tracing::debug;

use crate::{
    buffer::SampleBuffer,
    dsp::oscillator::Waveform,
    error::SynthesisError,
    synth::{analysis::PromptAnalysis, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE},
};

const RAMP: f64 = 0.1;
const BEATS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchParams {
    pub frequency: f64,
    pub waveform: Waveform,
    /// 0.5 to 1.0 depending on intensity.
    pub gain: f64,
    pub duration: f64,
}

impl SketchParams {
    pub fn from_analysis<R: Rng + ?Sized>(analysis: &PromptAnalysis, rng: &mut R) -> Self {
        Self {
            frequency: analysis.base_frequency(),
            waveform: Waveform::random(rng),
            gain: 0.5 + 0.5 * analysis.intensity.clamp(0.0, 1.0),
            duration: 60.0 / analysis.tempo.max(1.0) * BEATS,
        }
    }

    fn envelope(&self, t: f64) -> f64 {
        if t < RAMP {
            t / RAMP
        } else if t > self.duration - RAMP {
            ((self.duration - t) / RAMP).max(0.0)
        } else {
            1.0
        }
    }
}

/// Render a stereo sketch at `sample_rate`.
pub fn render_sketch(params: &SketchParams, sample_rate: u32) -> Result<SampleBuffer, SynthesisError> {
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(SynthesisError::UnsupportedSampleRate { rate: sample_rate });
    }
    if !(params.duration.is_finite() && params.duration > 0.0) {
        return Err(SynthesisError::InvalidDuration {
            seconds: params.duration,
        });
    }

    debug!(
        waveform = params.waveform.label(),
        frequency = params.frequency,
        seconds = params.duration,
        "rendering sketch"
    );

    let rate = sample_rate as f64;
    let frames = (rate * params.duration).floor() as usize;
    let lane: Vec<f32> = (0..frames)
        .map(|i| {
            let t = i as f64 / rate;
            (params.waveform.value_at(t, params.frequency) * params.gain * params.envelope(t)) as f32
        })
        .collect();

    Ok(SampleBuffer::from_channels(vec![lane; 2], sample_rate)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn params(waveform: Waveform) -> SketchParams {
        SketchParams {
            frequency: 100.0,
            waveform,
            gain: 0.8,
            duration: 1.0,
        }
    }

    #[test]
    fn duration_follows_tempo() {
        let analysis = PromptAnalysis {
            tempo: 120.0,
            intensity: 1.0,
            ..PromptAnalysis::default()
        };
        let p = SketchParams::from_analysis(&analysis, &mut StdRng::seed_from_u64(4));
        assert_eq!(p.duration, 2.0);
        assert_eq!(p.gain, 1.0);
        assert_eq!(p.frequency, 440.0);

        let buffer = render_sketch(&p, 8_000).unwrap();
        assert_eq!(buffer.frame_count(), 16_000);
        assert_eq!(buffer.channel_count(), 2);
    }

    #[test]
    fn ramps_at_both_ends() {
        let buffer = render_sketch(&params(Waveform::Square), 10_000).unwrap();
        let data = buffer.channel(0).unwrap();
        assert_eq!(data[0], 0.0);
        // 50 ms in: half way up the attack ramp.
        assert!((data[500].abs() - 0.4).abs() < 1e-3);
        assert!((data[5_000].abs() - 0.8).abs() < 1e-6);
        // 50 ms before the end: half way down the release ramp.
        assert!((data[9_500].abs() - 0.4).abs() < 1e-3);
    }

    #[test]
    fn stays_within_gain() {
        for waveform in Waveform::ALL {
            let buffer = render_sketch(&params(waveform), 8_000).unwrap();
            assert!(buffer.peak() <= 0.8 + 1e-6, "{}", waveform.label());
        }
    }

    #[test]
    fn rejects_unsupported_rate() {
        assert!(render_sketch(&params(Waveform::Sine), 0).is_err());
    }
}
