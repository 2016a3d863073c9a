//! Prompt to playable clip: analysis, synthesis, offline genre effect,
//! WAV encoding, and a blob handle. Failures past input validation fall back
//! to the voice's static asset instead of erroring.

use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};

use crate::{
    buffer::SampleBuffer,
    config::StudioConfig,
    engine::handles::{HandleStore, PlaybackHandle},
    error::{GenerateError, SynthesisError},
    io::wav,
    offline::{self, OfflineEffect},
    synth::{analyze_prompt, render_sketch, PromptAnalysis, SketchParams, Synthesizer, VoiceProfile},
};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub voice: String,
    /// Offline effect genre; the detected genre when `None`.
    pub genre: Option<String>,
    /// Render the single-oscillator sketch instead of the pattern set.
    pub sketch: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            voice: "default".into(),
            genre: None,
            sketch: false,
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn sketch(mut self, sketch: bool) -> Self {
        self.sketch = sketch;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationSource {
    Synthesized,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub handle: PlaybackHandle,
    pub analysis: PromptAnalysis,
    pub effect: OfflineEffect,
    pub source: GenerationSource,
}

impl Generation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, GenerationSource::Fallback { .. })
    }
}

/// A processed clip before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub buffer: SampleBuffer,
    pub analysis: PromptAnalysis,
    pub effect: OfflineEffect,
}

pub struct Generator {
    config: StudioConfig,
    rng: StdRng,
}

impl Generator {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic noise and waveform choices.
    pub fn with_seed(config: StudioConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Validate the prompt, then analyse it and pick the offline effect.
    fn prepare(request: &GenerateRequest) -> Result<(PromptAnalysis, OfflineEffect), GenerateError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        let analysis = analyze_prompt(&request.prompt);
        let effect = match &request.genre {
            Some(genre) => OfflineEffect::parse(genre),
            None => OfflineEffect::for_genre(analysis.genre),
        };
        Ok((analysis, effect))
    }

    fn synthesize(
        &mut self,
        request: &GenerateRequest,
        analysis: &PromptAnalysis,
        effect: OfflineEffect,
    ) -> Result<SampleBuffer, SynthesisError> {
        let voice = VoiceProfile::for_key(&request.voice);
        let buffer = if request.sketch {
            let params = SketchParams::from_analysis(analysis, &mut self.rng);
            render_sketch(&params, self.config.sample_rate)?
        } else {
            Synthesizer::with_length(self.config.sample_rate, self.config.render_seconds)?
                .synthesize(&request.prompt, voice, analysis)?
        };
        Ok(offline::apply_effect(&buffer, effect, &mut self.rng))
    }

    /// Run analysis, synthesis and the offline effect, surfacing failures.
    pub fn render(&mut self, request: &GenerateRequest) -> Result<Rendered, GenerateError> {
        let (analysis, effect) = Self::prepare(request)?;
        let buffer = self.synthesize(request, &analysis, effect)?;
        Ok(Rendered {
            buffer,
            analysis,
            effect,
        })
    }

    /// Produce a playable handle. Only an empty prompt is an error; any later
    /// failure returns the voice's fallback asset and records why.
    pub fn generate(&mut self, request: &GenerateRequest, store: &mut HandleStore) -> Result<Generation, GenerateError> {
        let (analysis, effect) = Self::prepare(request)?;
        info!(
            voice = %request.voice,
            genre = %analysis.genre,
            effect = effect.label(),
            sketch = request.sketch,
            "generation started"
        );

        match self.synthesize(request, &analysis, effect) {
            Ok(buffer) => {
                let handle = store.create(wav::encode(&buffer));
                info!(handle = %handle, seconds = buffer.duration(), "generation finished");
                Ok(Generation {
                    handle,
                    analysis,
                    effect,
                    source: GenerationSource::Synthesized,
                })
            }
            Err(err) => {
                let url = self
                    .config
                    .fallback_asset
                    .clone()
                    .unwrap_or_else(|| VoiceProfile::for_key(&request.voice).fallback_audio.to_string());
                warn!(error = %err, fallback = %url, "generation failed, using fallback asset");
                Ok(Generation {
                    handle: PlaybackHandle::Remote(url),
                    analysis,
                    effect,
                    source: GenerationSource::Fallback {
                        reason: err.to_string(),
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{genre::Genre, io::decode_wav, synth::voice::FALLBACK_AUDIO_URL};
    use std::io::Cursor;

    fn config() -> StudioConfig {
        StudioConfig {
            sample_rate: 8_000,
            ..StudioConfig::default()
        }
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let mut generator = Generator::with_seed(config(), 1);
        let mut store = HandleStore::new();
        assert_eq!(
            generator.generate(&GenerateRequest::new("   "), &mut store),
            Err(GenerateError::EmptyPrompt)
        );
        assert!(store.is_empty());
        assert_eq!(
            generator.render(&GenerateRequest::new("\t\n")),
            Err(GenerateError::EmptyPrompt)
        );
    }

    #[test]
    fn render_and_generate_agree_on_analysis_and_effect() {
        let request = GenerateRequest::new("dark phonk drift").genre("lofi");
        let rendered = Generator::with_seed(config(), 8).render(&request).unwrap();
        let generation = Generator::with_seed(config(), 8)
            .generate(&request, &mut HandleStore::new())
            .unwrap();
        assert_eq!(rendered.analysis, generation.analysis);
        assert_eq!(rendered.effect, generation.effect);
        assert_eq!(generation.effect, OfflineEffect::Lofi);
    }

    #[test]
    fn generates_a_playable_blob() {
        let mut generator = Generator::with_seed(config(), 7);
        let mut store = HandleStore::new();
        let request = GenerateRequest::new("chill lofi beat with vinyl crackle").voice("Soft Lofi");

        let generation = generator.generate(&request, &mut store).unwrap();
        assert_eq!(generation.source, GenerationSource::Synthesized);
        assert_eq!(generation.analysis.genre, Genre::Lofi);
        assert_eq!(generation.effect, OfflineEffect::Lofi);
        assert!(generation.handle.needs_release());

        let bytes = store.resolve(&generation.handle).unwrap();
        let decoded = decode_wav(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), 32_000);
        assert_eq!(decoded.sample_rate(), 8_000);

        assert!(store.release(&generation.handle));
    }

    #[test]
    fn requested_genre_overrides_detection() {
        let mut generator = Generator::with_seed(config(), 3);
        let request = GenerateRequest::new("lofi study tape").genre("EDM");
        let rendered = generator.render(&request).unwrap();
        assert_eq!(rendered.analysis.genre, Genre::Lofi);
        assert_eq!(rendered.effect, OfflineEffect::Edm);
    }

    #[test]
    fn synthesis_failure_returns_voice_fallback() {
        let broken = StudioConfig {
            sample_rate: 100,
            ..StudioConfig::default()
        };
        let mut generator = Generator::with_seed(broken, 1);
        let mut store = HandleStore::new();

        let generation = generator
            .generate(&GenerateRequest::new("anything at all"), &mut store)
            .unwrap();
        assert!(generation.is_fallback());
        assert_eq!(generation.handle, PlaybackHandle::Remote(FALLBACK_AUDIO_URL.into()));
        assert!(store.is_empty());
        let GenerationSource::Fallback { reason } = generation.source else {
            panic!("expected a fallback");
        };
        assert!(reason.contains("100 Hz"));
    }

    #[test]
    fn configured_fallback_wins() {
        let broken = StudioConfig {
            sample_rate: 100,
            fallback_asset: Some("https://assets.example/fallback.wav".into()),
            ..StudioConfig::default()
        };
        let mut generator = Generator::with_seed(broken, 1);
        let generation = generator
            .generate(&GenerateRequest::new("x"), &mut HandleStore::new())
            .unwrap();
        assert_eq!(generation.handle.url(), "https://assets.example/fallback.wav");
    }

    #[test]
    fn sketch_follows_tempo() {
        let mut generator = Generator::with_seed(config(), 11);
        let request = GenerateRequest::new("edm at 120 bpm").sketch(true);
        let rendered = generator.render(&request).unwrap();
        assert_eq!(rendered.buffer.frame_count(), 16_000);
    }

    #[test]
    fn same_seed_same_bytes() {
        let request = GenerateRequest::new("gritty trap with 808 bass").voice("Male Pop");
        let a = Generator::with_seed(config(), 42).render(&request).unwrap();
        let b = Generator::with_seed(config(), 42).render(&request).unwrap();
        assert_eq!(a, b);
    }
}
