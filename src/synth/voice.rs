//! Voice profiles.
//!
//! A voice colours the pattern synthesizer (pitch multiplier and harmonic
//! weight) and names the static asset handed back when generation fails.
//! Keys are matched like genre names: case-insensitive, whitespace, `-` and
//! `_` ignored. Unknown keys get the default voice.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const FALLBACK_AUDIO_URL: &str = "https://cdn.freesound.org/previews/388/388713_7364899-lq.mp3";

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    /// `(frequency multiplier, harmonic weight)` for the pattern synthesizer.
    pub fn synthesis_weights(self) -> (f64, f64) {
        match self {
            Gender::Male => (0.7, 0.7),
            Gender::Female => (1.3, 0.4),
            Gender::Neutral => (1.0, 0.5),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    /// Table key, as shown in voice pickers.
    pub key: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    /// Language-tagged id handed to speech engines.
    pub synthesis_voice_id: &'static str,
    pub fallback_audio: &'static str,
}

/// Parameters for a speech-engine rendition of this voice.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    pub voice_id: &'static str,
    pub pitch: f32,
    pub rate: f32,
}

const fn voice(key: &'static str, name: &'static str, gender: Gender, id: &'static str) -> VoiceProfile {
    VoiceProfile {
        key,
        name,
        gender,
        synthesis_voice_id: id,
        fallback_audio: FALLBACK_AUDIO_URL,
    }
}

static VOICES: [VoiceProfile; 7] = [
    voice("Male Pop", "Male Pop", Gender::Male, "en-US-male"),
    voice("Female RnB", "Female RnB", Gender::Female, "en-US-female"),
    voice("Robotic", "Robotic", Gender::Neutral, "en-US-neural"),
    voice("Soft Lofi", "Soft Lofi", Gender::Female, "en-US-female"),
    voice("Anime Style", "Anime Style", Gender::Female, "ja-JP-female"),
    voice("Auto Harmony", "Auto Harmony", Gender::Neutral, "en-US-neural"),
    voice("default", "Default Voice", Gender::Neutral, "en-US-neural"),
];

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl VoiceProfile {
    pub fn all() -> &'static [VoiceProfile] {
        &VOICES
    }

    pub fn default_voice() -> &'static VoiceProfile {
        &VOICES[VOICES.len() - 1]
    }

    pub fn lookup(key: &str) -> Option<&'static VoiceProfile> {
        let wanted = normalize(key);
        VOICES.iter().find(|v| normalize(v.key) == wanted)
    }

    /// Profile for `key`, or the default voice.
    pub fn for_key(key: &str) -> &'static VoiceProfile {
        Self::lookup(key).unwrap_or_else(Self::default_voice)
    }

    pub fn speech_params(&self) -> SpeechParams {
        let (pitch, rate) = match self.gender {
            Gender::Male => (0.8, 0.95),
            Gender::Female => (1.2, 1.0),
            Gender::Neutral => (1.0, 1.0),
        };
        SpeechParams {
            voice_id: self.synthesis_voice_id,
            pitch,
            rate,
        }
    }
}

/// A voice offered by the host's speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemVoice {
    pub name: String,
    /// BCP 47 tag, e.g. `en-GB`.
    pub lang: String,
}

impl SystemVoice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_english(&self) -> bool {
        self.lang.to_lowercase().starts_with("en")
    }

    fn matches(&self, gender: Gender) -> bool {
        let name = self.name.to_lowercase();
        match gender {
            Gender::Female => name.contains("female"),
            // "female" contains "male"; only count standalone matches.
            Gender::Male => name.replace("female", "").contains("male"),
            Gender::Neutral => false,
        }
    }
}

/// Best available system voice for a voice key: English with a matching
/// gender, then any English voice, then the first one offered.
pub fn find_matching_voice<'a>(available: &'a [SystemVoice], key: &str) -> Option<&'a SystemVoice> {
    let gender = VoiceProfile::for_key(key).gender;
    available
        .iter()
        .find(|v| v.is_english() && v.matches(gender))
        .or_else(|| available.iter().find(|v| v.is_english()))
        .or_else(|| available.first())
}
