use std::fmt;

use tracing::debug;

use crate::{
    dsp::{dynamics::CompressorParams, filter::FilterType},
    genre::Genre,
    graph::{
        chain::EffectChain, delay::DelayNode, distortion::WaveShaperNode, dynamics::CompressorNode,
        filter::FilterNode, node::GraphNode,
    },
};

/*
Genre Effect Chains
===================

Each genre maps to a short, fixed chain of live processing stages. The table
is static data; `build_chain` turns a row into fresh graph nodes every time it
is called, so building is side-effect free and two sources never share filter
state.

| genre      | stages                                                        |
| ---------- | ------------------------------------------------------------- |
| EDM        | compressor -24 dB / knee 30 / 12:1 / 3 ms / 250 ms            |
| Deep House | lowpass 1 kHz Q1 → lowshelf 100 Hz +8 dB                      |
| R&B        | peaking 800 Hz Q1 +3 dB                                       |
| Trap       | lowshelf 60 Hz +10 dB → highshelf 8 kHz +5 dB                 |
| Lofi       | lowpass 3.5 kHz → lowshelf 2 kHz -6 dB → peaking 800 Hz Q0.8 +4 |
| Phonk      | waveshaper (amount 50) → delay 100 ms                         |
| HipHop     | highpass 60 Hz → lowshelf 100 Hz +6 dB                        |
| default    | peaking 1 kHz Q1 +2 dB                                        |

Filters without an explicit Q use Q = 1.
*/

/// What a stage does, independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    LowPass,
    HighPass,
    LowShelf,
    HighShelf,
    Peaking,
    Compressor,
    Distortion,
    Delay,
}

impl StageKind {
    pub fn label(self) -> &'static str {
        match self {
            StageKind::LowPass => "lowpass",
            StageKind::HighPass => "highpass",
            StageKind::LowShelf => "lowshelf",
            StageKind::HighShelf => "highshelf",
            StageKind::Peaking => "peaking",
            StageKind::Compressor => "compressor",
            StageKind::Distortion => "distortion",
            StageKind::Delay => "delay",
        }
    }
}

/// One row entry of a genre chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Filter {
        filter_type: FilterType,
        frequency: f32,
        q: f32,
        gain_db: f32,
    },
    Compressor(CompressorParams),
    Distortion {
        amount: f64,
    },
    Delay {
        seconds: f32,
    },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Filter { filter_type, .. } => match filter_type {
                FilterType::LowPass => StageKind::LowPass,
                FilterType::HighPass => StageKind::HighPass,
                FilterType::LowShelf => StageKind::LowShelf,
                FilterType::HighShelf => StageKind::HighShelf,
                FilterType::Peaking => StageKind::Peaking,
            },
            Stage::Compressor(_) => StageKind::Compressor,
            Stage::Distortion { .. } => StageKind::Distortion,
            Stage::Delay { .. } => StageKind::Delay,
        }
    }

    /// Instantiate a fresh node for this stage.
    pub fn build(&self) -> Box<dyn GraphNode> {
        match *self {
            Stage::Filter {
                filter_type,
                frequency,
                q,
                gain_db,
            } => Box::new(FilterNode::new(filter_type, frequency, q, gain_db)),
            Stage::Compressor(params) => Box::new(CompressorNode::new(params)),
            Stage::Distortion { amount } => Box::new(WaveShaperNode::with_amount(amount)),
            Stage::Delay { seconds } => Box::new(DelayNode::new(seconds)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Filter {
                filter_type: FilterType::LowShelf | FilterType::HighShelf,
                frequency,
                gain_db,
                ..
            } => write!(f, "{} {frequency} Hz {gain_db:+} dB", self.kind().label()),
            Stage::Filter {
                filter_type: FilterType::Peaking,
                frequency,
                q,
                gain_db,
            } => write!(f, "peaking {frequency} Hz Q{q} {gain_db:+} dB"),
            Stage::Filter { frequency, q, .. } => {
                write!(f, "{} {frequency} Hz Q{q}", self.kind().label())
            }
            Stage::Compressor(p) => write!(
                f,
                "compressor {} dB knee {} ratio {} attack {} s release {} s",
                p.threshold_db, p.knee_db, p.ratio, p.attack, p.release
            ),
            Stage::Distortion { amount } => write!(f, "distortion amount {amount}"),
            Stage::Delay { seconds } => write!(f, "delay {} ms", (seconds * 1000.0).round()),
        }
    }
}

/// Static description of a genre's live chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreEffectSpec {
    pub genre: Genre,
    pub name: &'static str,
    pub description: &'static str,
    pub stages: &'static [Stage],
}

const fn filter(filter_type: FilterType, frequency: f32, q: f32, gain_db: f32) -> Stage {
    Stage::Filter {
        filter_type,
        frequency,
        q,
        gain_db,
    }
}

static EDM: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::Edm,
    name: "EDM",
    description: "Sidechain, Big Room reverb",
    stages: &[Stage::Compressor(CompressorParams {
        threshold_db: -24.0,
        knee_db: 30.0,
        ratio: 12.0,
        attack: 0.003,
        release: 0.25,
    })],
};

static DEEP_HOUSE: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::DeepHouse,
    name: "Deep House",
    description: "Lowpass filter, Sub Bass thump",
    stages: &[
        filter(FilterType::LowPass, 1_000.0, 1.0, 0.0),
        filter(FilterType::LowShelf, 100.0, 1.0, 8.0),
    ],
};

static RNB: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::RnB,
    name: "R&B",
    description: "Smooth harmonics, Soul EQ",
    stages: &[filter(FilterType::Peaking, 800.0, 1.0, 3.0)],
};

static TRAP: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::Trap,
    name: "Trap",
    description: "808 boost, glitch hats",
    stages: &[
        filter(FilterType::LowShelf, 60.0, 1.0, 10.0),
        filter(FilterType::HighShelf, 8_000.0, 1.0, 5.0),
    ],
};

static LOFI: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::Lofi,
    name: "Lofi",
    description: "Vinyl hiss, warm tape tone",
    stages: &[
        filter(FilterType::LowPass, 3_500.0, 1.0, 0.0),
        filter(FilterType::LowShelf, 2_000.0, 1.0, -6.0),
        filter(FilterType::Peaking, 800.0, 0.8, 4.0),
    ],
};

static PHONK: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::Phonk,
    name: "Phonk",
    description: "Memphis vocal FX, retro tape delay",
    stages: &[Stage::Distortion { amount: 50.0 }, Stage::Delay { seconds: 0.1 }],
};

static HIPHOP: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::HipHop,
    name: "HipHop",
    description: "Vinyl crackle, Boom Bap drums",
    stages: &[
        filter(FilterType::HighPass, 60.0, 1.0, 0.0),
        filter(FilterType::LowShelf, 100.0, 1.0, 6.0),
    ],
};

static DEFAULT: GenreEffectSpec = GenreEffectSpec {
    genre: Genre::Default,
    name: "Default",
    description: "Slight presence lift",
    stages: &[filter(FilterType::Peaking, 1_000.0, 1.0, 2.0)],
};

/// Table row for a genre.
pub fn effect_spec(genre: Genre) -> &'static GenreEffectSpec {
    match genre {
        Genre::Edm => &EDM,
        Genre::DeepHouse => &DEEP_HOUSE,
        Genre::RnB => &RNB,
        Genre::Trap => &TRAP,
        Genre::Lofi => &LOFI,
        Genre::Phonk => &PHONK,
        Genre::HipHop => &HIPHOP,
        Genre::Default => &DEFAULT,
    }
}

/// Table row for a free-form name; unknown names get the default row.
pub fn lookup(name: &str) -> &'static GenreEffectSpec {
    effect_spec(Genre::parse(name))
}

/// All rows in display order.
pub fn table() -> impl Iterator<Item = &'static GenreEffectSpec> {
    Genre::ALL.into_iter().map(effect_spec)
}

impl GenreEffectSpec {
    /// Fresh, unconnected nodes for this row.
    pub fn build(&self) -> EffectChain {
        let mut chain = EffectChain::new();
        for stage in self.stages {
            chain.push_boxed(stage.build());
        }
        chain
    }

    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }
}

/// Build the live chain for a free-form genre name.
pub fn build_chain(name: &str) -> EffectChain {
    let spec = lookup(name);
    debug!(requested = name, genre = spec.name, stages = spec.stages.len(), "building effect chain");
    spec.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::RenderCtx;

    #[test]
    fn every_genre_has_a_row() {
        for genre in Genre::ALL {
            assert_eq!(effect_spec(genre).genre, genre);
            assert!(!effect_spec(genre).stages.is_empty());
        }
    }

    #[test]
    fn unknown_genre_uses_default_chain() {
        let spec = lookup("Polka");
        assert_eq!(spec.genre, Genre::Default);
        assert_eq!(spec.kinds(), vec![StageKind::Peaking]);
        assert_eq!(build_chain("Polka").labels(), vec!["peaking"]);
    }

    #[test]
    fn lofi_chain_has_three_stages_in_order() {
        let chain = build_chain("Lofi");
        assert_eq!(chain.labels(), vec!["lowpass", "lowshelf", "peaking"]);
    }

    #[test]
    fn phonk_chain_distorts_then_delays() {
        assert_eq!(
            lookup("phonk").kinds(),
            vec![StageKind::Distortion, StageKind::Delay]
        );
        assert_eq!(build_chain("Phonk").labels(), vec!["distortion", "delay"]);
    }

    #[test]
    fn edm_compressor_parameters() {
        let Stage::Compressor(params) = lookup("EDM").stages[0] else {
            panic!("EDM chain should start with a compressor");
        };
        assert_eq!(params.threshold_db, -24.0);
        assert_eq!(params.knee_db, 30.0);
        assert_eq!(params.ratio, 12.0);
    }

    #[test]
    fn building_twice_gives_independent_chains() {
        let ctx = RenderCtx::new(44_100.0);
        let mut first = build_chain("Phonk");
        let mut second = build_chain("Phonk");

        let mut loud = vec![1.0; 8_000];
        first.render_block(&mut loud, &ctx);

        let mut silent = vec![0.0; 8_000];
        second.render_block(&mut silent, &ctx);
        assert!(silent.iter().all(|&s| s.abs() < 1e-3));
    }

    #[test]
    fn stage_descriptions_are_readable() {
        assert_eq!(lookup("Trap").stages[0].to_string(), "lowshelf 60 Hz +10 dB");
        assert_eq!(lookup("Phonk").stages[1].to_string(), "delay 100 ms");
    }
}
