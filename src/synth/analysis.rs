//! Keyword heuristics that turn a free-text prompt into synthesis inputs.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::genre::Genre;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Aggressive,
    Romantic,
    #[default]
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Energetic,
        Mood::Calm,
        Mood::Aggressive,
        Mood::Romantic,
        Mood::Neutral,
    ];

    /// Multiplier applied to the genre's base frequency.
    pub fn frequency_multiplier(self) -> f64 {
        match self {
            Mood::Happy => 1.2,
            Mood::Sad => 0.8,
            Mood::Energetic => 1.5,
            Mood::Calm => 0.6,
            Mood::Aggressive => 2.0,
            Mood::Romantic | Mood::Neutral => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Calm => "Calm",
            Mood::Aggressive => "Aggressive",
            Mood::Romantic => "Romantic",
            Mood::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PromptAnalysis {
    pub genre: Genre,
    pub mood: Mood,
    /// Beats per minute.
    pub tempo: f64,
    /// 0 (gentle) to 1 (intense).
    pub intensity: f64,
    pub emotional_tags: Vec<String>,
    pub elements: Vec<String>,
}

impl Default for PromptAnalysis {
    fn default() -> Self {
        Self {
            genre: Genre::Default,
            mood: Mood::Neutral,
            tempo: Genre::Default.default_tempo(),
            intensity: DEFAULT_INTENSITY,
            emotional_tags: Vec::new(),
            elements: Vec::new(),
        }
    }
}

impl PromptAnalysis {
    /// Genre base frequency scaled by the mood.
    pub fn base_frequency(&self) -> f64 {
        self.genre.base_frequency() * self.mood.frequency_multiplier()
    }
}

const DEFAULT_INTENSITY: f64 = 0.5;
const MIN_TEMPO: f64 = 40.0;
const MAX_TEMPO: f64 = 300.0;

// Checked in order; the first genre with a hit wins.
const GENRE_KEYWORDS: &[(Genre, &[&str])] = &[
    (Genre::DeepHouse, &["deep house", "deephouse", "house"]),
    (Genre::Trap, &["trap", "808"]),
    (Genre::Lofi, &["lofi", "lo fi", "chillhop", "study", "vinyl"]),
    (Genre::Phonk, &["phonk", "memphis", "drift"]),
    (Genre::RnB, &["r&b", "rnb", "soul", "smooth"]),
    (Genre::HipHop, &["hip hop", "hiphop", "rap", "boom bap"]),
    (Genre::Edm, &["edm", "electronic", "dance", "rave", "festival", "techno"]),
];

// The mood with the most hits wins; ties go to the earlier row.
const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Happy, &["happy", "joy", "joyful", "cheerful", "sunny", "upbeat", "bright"]),
    (Mood::Sad, &["sad", "melancholy", "lonely", "heartbreak", "tears", "cry", "blue"]),
    (Mood::Energetic, &["energetic", "energy", "hype", "pumped", "party", "euphoric"]),
    (Mood::Calm, &["calm", "relax", "relaxing", "peaceful", "serene", "mellow", "chill"]),
    (Mood::Aggressive, &["aggressive", "angry", "rage", "dark", "hard", "heavy"]),
    (Mood::Romantic, &["romantic", "love", "sensual", "passion", "tender"]),
];

const ELEMENT_KEYWORDS: &[&str] = &[
    "bass", "808", "drums", "kick", "snare", "hats", "piano", "guitar", "synth", "pads",
    "strings", "vocals", "vinyl", "claps", "bells",
];

const INTENSE_WORDS: &[&str] = &[
    "intense", "hard", "heavy", "loud", "powerful", "aggressive", "energetic", "hype", "massive",
];
const GENTLE_WORDS: &[&str] = &["soft", "gentle", "calm", "quiet", "mellow", "chill", "relaxing", "light"];

const FAST_WORDS: &[&str] = &["fast", "faster", "uptempo", "quick"];
const SLOW_WORDS: &[&str] = &["slow", "slower", "downtempo", "laid back"];

/// Lowercase, keep letters, digits and `&`, drop `-`, everything else
/// becomes a single space. Padded with spaces so whole-word matching is a
/// substring search for `" word "`.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '&' {
            out.push(c);
        } else if c == '-' {
            continue;
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if !out.ends_with(' ') {
        out.push(' ');
    }
    out
}

fn has_word(haystack: &str, word: &str) -> bool {
    haystack.contains(&format!(" {word} "))
}

fn count_words(haystack: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| has_word(haystack, w)).count()
}

/// Explicit "NNN bpm" or "NNNbpm" within the accepted range.
fn explicit_tempo(haystack: &str) -> Option<f64> {
    let tokens: Vec<&str> = haystack.split_whitespace().collect();
    tokens.iter().enumerate().find_map(|(i, token)| {
        let number = if let Some(prefix) = token.strip_suffix("bpm") {
            prefix
        } else if tokens.get(i + 1) == Some(&"bpm") {
            token
        } else {
            return None;
        };
        number
            .parse::<f64>()
            .ok()
            .filter(|bpm| (MIN_TEMPO..=MAX_TEMPO).contains(bpm))
    })
}

/// Analyze a prompt. Empty or keyword-free text yields the defaults.
pub fn analyze_prompt(text: &str) -> PromptAnalysis {
    let haystack = normalize(text);

    let genre = GENRE_KEYWORDS
        .iter()
        .find(|(_, words)| count_words(&haystack, words) > 0)
        .map(|(genre, _)| *genre)
        .unwrap_or_default();

    let mut mood = Mood::Neutral;
    let mut best = 0;
    let mut emotional_tags = Vec::new();
    for (candidate, words) in MOOD_KEYWORDS {
        let hits = count_words(&haystack, words);
        if hits > 0 {
            emotional_tags.push(candidate.label().to_lowercase());
        }
        if hits > best {
            best = hits;
            mood = *candidate;
        }
    }

    let elements = ELEMENT_KEYWORDS
        .iter()
        .filter(|w| has_word(&haystack, w))
        .map(|w| w.to_string())
        .collect();

    let tempo = explicit_tempo(&haystack).unwrap_or_else(|| {
        let mut bpm = genre.default_tempo();
        if count_words(&haystack, FAST_WORDS) > 0 {
            bpm += 20.0;
        }
        if count_words(&haystack, SLOW_WORDS) > 0 {
            bpm -= 20.0;
        }
        bpm.clamp(MIN_TEMPO, MAX_TEMPO)
    });

    let exclamations = text.chars().filter(|&c| c == '!').count().min(4);
    let intensity = (DEFAULT_INTENSITY + 0.1 * count_words(&haystack, INTENSE_WORDS) as f64
        - 0.1 * count_words(&haystack, GENTLE_WORDS) as f64
        + 0.05 * exclamations as f64)
        .clamp(0.0, 1.0);

    PromptAnalysis {
        genre,
        mood,
        tempo,
        intensity,
        emotional_tags,
        elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_gets_defaults() {
        let analysis = analyze_prompt("");
        assert_eq!(analysis, PromptAnalysis::default());
        assert_eq!(analysis.base_frequency(), 440.0);
    }

    #[test]
    fn detects_genre_and_mood() {
        let analysis = analyze_prompt("A sad lo-fi beat for a rainy study session");
        assert_eq!(analysis.genre, Genre::Lofi);
        assert_eq!(analysis.mood, Mood::Sad);
        assert_eq!(analysis.tempo, 80.0);
        assert!((analysis.base_frequency() - 330.0 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn words_match_whole() {
        // "trapped" is not "trap" and "housework" is not "house"
        let analysis = analyze_prompt("trapped doing housework");
        assert_eq!(analysis.genre, Genre::Default);
    }

    #[test]
    fn explicit_bpm_wins() {
        assert_eq!(analyze_prompt("slow trap at 150 bpm").tempo, 150.0);
        assert_eq!(analyze_prompt("edm 174BPM banger").tempo, 174.0);
        // Out of range numbers are ignored.
        assert_eq!(analyze_prompt("edm 9000 bpm").tempo, 128.0);
    }

    #[test]
    fn fast_and_slow_shift_default_tempo() {
        assert_eq!(analyze_prompt("fast hip hop").tempo, 115.0);
        assert_eq!(analyze_prompt("slow r&b jam").tempo, 70.0);
    }

    #[test]
    fn intensity_tracks_wording() {
        let loud = analyze_prompt("intense heavy massive drop!!!");
        let soft = analyze_prompt("soft gentle quiet piano");
        assert!(loud.intensity > 0.8);
        assert!((soft.intensity - 0.2).abs() < 1e-9);
        assert!((analyze_prompt("!!!!!!!!!!").intensity - 0.7).abs() < 1e-9);
    }

    #[test]
    fn collects_tags_and_elements() {
        let analysis = analyze_prompt("Happy love song with piano, strings and 808 bass");
        assert_eq!(analysis.emotional_tags, vec!["happy", "romantic"]);
        assert_eq!(analysis.elements, vec!["bass", "808", "piano", "strings"]);
        assert_eq!(analysis.genre, Genre::Trap);
    }
}
