//! Genre names and the per-genre tables built on them.
//!
//! Free-form genre names arrive from the UI, the CLI and the prompt analyzer.
//! [`Genre::parse`] is the single normalization used by both the live effect
//! chains and the offline processor: case-insensitive, with whitespace, `-`
//! and `_` ignored, plus a few aliases ("electronic", "rnb"). Anything that
//! does not match lands on [`Genre::Default`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Genre effect-chain tables.
pub mod effects;

pub use effects::{build_chain, effect_spec, GenreEffectSpec, Stage};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Genre {
    Edm,
    DeepHouse,
    RnB,
    Trap,
    Lofi,
    Phonk,
    HipHop,
    #[default]
    Default,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::Edm,
        Genre::DeepHouse,
        Genre::RnB,
        Genre::Trap,
        Genre::Lofi,
        Genre::Phonk,
        Genre::HipHop,
        Genre::Default,
    ];

    /// Normalize a free-form name. Never fails.
    pub fn parse(name: &str) -> Self {
        Self::lookup(name).unwrap_or(Genre::Default)
    }

    /// Normalize a free-form name, returning `None` for unknown genres.
    pub fn lookup(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "edm" | "electronic" => Some(Genre::Edm),
            "deephouse" => Some(Genre::DeepHouse),
            "r&b" | "rnb" | "randb" => Some(Genre::RnB),
            "trap" => Some(Genre::Trap),
            "lofi" => Some(Genre::Lofi),
            "phonk" => Some(Genre::Phonk),
            "hiphop" => Some(Genre::HipHop),
            "default" => Some(Genre::Default),
            _ => None,
        }
    }

    /// Display name as shown in the studio.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Edm => "EDM",
            Genre::DeepHouse => "Deep House",
            Genre::RnB => "R&B",
            Genre::Trap => "Trap",
            Genre::Lofi => "Lofi",
            Genre::Phonk => "Phonk",
            Genre::HipHop => "HipHop",
            Genre::Default => "default",
        }
    }

    /// Root pitch of the synthesized patterns, before mood and voice scaling.
    pub fn base_frequency(self) -> f64 {
        match self {
            Genre::Edm => 440.0,
            Genre::DeepHouse => 110.0,
            Genre::RnB => 220.0,
            Genre::Trap => 55.0,
            Genre::Lofi => 330.0,
            Genre::HipHop => 165.0,
            Genre::Phonk | Genre::Default => 440.0,
        }
    }

    /// Default tempo used when the prompt does not state one.
    pub fn default_tempo(self) -> f64 {
        match self {
            Genre::Edm => 128.0,
            Genre::DeepHouse => 122.0,
            Genre::RnB => 90.0,
            Genre::Trap => 140.0,
            Genre::Lofi => 80.0,
            Genre::Phonk => 130.0,
            Genre::HipHop => 95.0,
            Genre::Default => 120.0,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
