use tracing::debug;

use crate::{
    buffer::SampleBuffer,
    dsp::oscillator::blend,
    error::SynthesisError,
    synth::{
        analysis::PromptAnalysis,
        pattern::{patterns_for_prompt, Pattern},
        voice::VoiceProfile,
        MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, RENDER_SECONDS,
    },
};

const OUTPUT_CHANNELS: usize = 2;
const FADE_IN: f64 = 0.1;
const FADE_OUT: f64 = 0.2;
const OUTPUT_SCALE: f64 = 0.5;

/// Renders prompt patterns into fixed-length stereo clips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synthesizer {
    sample_rate: u32,
    seconds: f64,
}

impl Synthesizer {
    pub fn new(sample_rate: u32) -> Result<Self, SynthesisError> {
        Self::with_length(sample_rate, RENDER_SECONDS)
    }

    pub fn with_length(sample_rate: u32, seconds: f64) -> Result<Self, SynthesisError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(SynthesisError::UnsupportedSampleRate { rate: sample_rate });
        }
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(SynthesisError::InvalidDuration { seconds });
        }
        Ok(Self { sample_rate, seconds })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn frame_count(&self) -> usize {
        (self.sample_rate as f64 * self.seconds).floor() as usize
    }

    /// Render the patterns for `prompt`, pitched by the analysis and coloured
    /// by the voice.
    pub fn synthesize(
        &self,
        prompt: &str,
        voice: &VoiceProfile,
        analysis: &PromptAnalysis,
    ) -> Result<SampleBuffer, SynthesisError> {
        let patterns = patterns_for_prompt(prompt, analysis.intensity);
        let (multiplier, harmonic_weight) = voice.gender.synthesis_weights();
        let base = analysis.base_frequency() * multiplier;

        debug!(
            voice = voice.name,
            genre = %analysis.genre,
            mood = %analysis.mood,
            base_hz = base,
            patterns = patterns.len(),
            "synthesizing prompt"
        );

        self.render(&patterns, base, harmonic_weight)
    }

    /// Sum `patterns` over `base_frequency` and apply the master fades.
    /// Every output channel carries the same signal.
    pub fn render(
        &self,
        patterns: &[Pattern],
        base_frequency: f64,
        harmonic_weight: f64,
    ) -> Result<SampleBuffer, SynthesisError> {
        let frames = self.frame_count();
        let rate = self.sample_rate as f64;
        let total = self.seconds;

        let mut lane = vec![0.0f32; frames];
        for (i, out) in lane.iter_mut().enumerate() {
            let t = i as f64 / rate;
            let mut sample = 0.0;
            for pattern in patterns {
                let envelope = pattern.envelope_at(t, total);
                if envelope == 0.0 {
                    continue;
                }
                let frequency = base_frequency * pattern.frequency_ratio;
                sample += blend(t, frequency, harmonic_weight) * envelope * pattern.amplitude;
            }

            let master = (t / FADE_IN).min(1.0) * ((total - t) / FADE_OUT).min(1.0);
            *out = (sample * master * OUTPUT_SCALE) as f32;
        }

        Ok(SampleBuffer::from_channels(vec![lane; OUTPUT_CHANNELS], self.sample_rate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::analysis::analyze_prompt;

    #[test]
    fn renders_four_second_stereo() {
        let synth = Synthesizer::new(8_000).unwrap();
        let prompt = "happy edm anthem";
        let buffer = synth
            .synthesize(prompt, VoiceProfile::default_voice(), &analyze_prompt(prompt))
            .unwrap();

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 32_000);
        assert_eq!(buffer.sample_rate(), 8_000);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        assert!(buffer.peak() > 0.05);
        assert!(buffer.peak() <= 1.0);
    }

    #[test]
    fn fades_in_from_silence() {
        let synth = Synthesizer::new(8_000).unwrap();
        let buffer = synth
            .synthesize("a", VoiceProfile::default_voice(), &PromptAnalysis::default())
            .unwrap();
        assert_eq!(buffer.channel(0).unwrap()[0], 0.0);
    }

    #[test]
    fn single_sine_partial_matches_formula() {
        let synth = Synthesizer::with_length(4_000, 1.0).unwrap();
        let pattern = Pattern::new(
            1.0,
            1.0,
            crate::dsp::envelope::Adsr::new(0.0, 0.0, 1.0, 0.0),
            0.0,
            1.0,
            1.0,
        );
        let buffer = synth.render(&[pattern], 10.0, 0.0).unwrap();
        let data = buffer.channel(0).unwrap();

        // t = 0.5: sine at 10 Hz is 0, master envelope is 1.
        assert!(data[2_000].abs() < 1e-4);
        // t = 0.525: quarter period, sin = 1, scaled by 0.5.
        assert!((data[2_100] - 0.5).abs() < 1e-4);
        // t = 0.025: sin = 1 again, fade-in at a quarter.
        assert!((data[100] - 0.125).abs() < 1e-4);
    }

    #[test]
    fn rejects_bad_rates_and_lengths() {
        assert_eq!(
            Synthesizer::new(100),
            Err(SynthesisError::UnsupportedSampleRate { rate: 100 })
        );
        assert!(Synthesizer::new(1_000_000).is_err());
        assert!(matches!(
            Synthesizer::with_length(44_100, 0.0),
            Err(SynthesisError::InvalidDuration { .. })
        ));
        assert!(Synthesizer::with_length(44_100, f64::NAN).is_err());
    }

    #[test]
    fn voice_changes_the_timbre() {
        let synth = Synthesizer::with_length(8_000, 1.0).unwrap();
        let analysis = PromptAnalysis::default();
        let male = synth
            .synthesize("a", VoiceProfile::for_key("Male Pop"), &analysis)
            .unwrap();
        let female = synth
            .synthesize("a", VoiceProfile::for_key("Female RnB"), &analysis)
            .unwrap();
        assert_ne!(male, female);
    }
}
