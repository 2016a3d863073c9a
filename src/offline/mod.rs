//! Offline genre processing applied directly to sample arrays.
//!
//! Unlike the live chains in [`crate::genre::effects`], these branches are
//! single-pass sample formulas run once over a finished buffer. Each channel
//! keeps O(1) state (at most one smoother) and the input buffer is never
//! modified: a new buffer of the same shape comes back.
//!
//! | branch  | genres        | character                                   |
//! | ------- | ------------- | ------------------------------------------- |
//! | rnb     | R&B           | warm one-pole lowpass, tanh warmth, knee    |
//! | edm     | EDM           | bright + tanh punch, 4 Hz sidechain pump    |
//! | hiphop  | HipHop, Trap  | 60 Hz sub layer, faint grit noise           |
//! | lofi    | Lofi          | darker smoother, 6-bit crush, crackle       |
//! | enhance | anything else | gentle tanh enhancement                     |
//!
//! The hiphop and lofi branches draw noise; pass a seeded RNG to
//! [`apply_with_rng`] for reproducible output.

use std::f64::consts::{PI, TAU};

use rand::{thread_rng, Rng};
use tracing::debug;

use crate::{
    buffer::SampleBuffer,
    dsp::{
        distortion::{quantize, saturate, soft_knee},
        filter::OnePole,
        oscillator::white_noise,
    },
    genre::Genre,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineEffect {
    RnB,
    Edm,
    HipHop,
    Lofi,
    Enhance,
}

impl OfflineEffect {
    pub fn for_genre(genre: Genre) -> Self {
        match genre {
            Genre::RnB => OfflineEffect::RnB,
            Genre::Edm => OfflineEffect::Edm,
            Genre::HipHop | Genre::Trap => OfflineEffect::HipHop,
            Genre::Lofi => OfflineEffect::Lofi,
            Genre::DeepHouse | Genre::Phonk | Genre::Default => OfflineEffect::Enhance,
        }
    }

    pub fn parse(name: &str) -> Self {
        Self::for_genre(Genre::parse(name))
    }

    pub fn label(self) -> &'static str {
        match self {
            OfflineEffect::RnB => "rnb",
            OfflineEffect::Edm => "edm",
            OfflineEffect::HipHop => "hiphop",
            OfflineEffect::Lofi => "lofi",
            OfflineEffect::Enhance => "default",
        }
    }

    /// Whether output depends on the RNG.
    pub fn is_noisy(self) -> bool {
        matches!(self, OfflineEffect::HipHop | OfflineEffect::Lofi)
    }
}

/// Process `buffer` with the branch for `genre_key`, using thread-local
/// randomness for the noise terms.
pub fn apply(buffer: &SampleBuffer, genre_key: &str) -> SampleBuffer {
    apply_with_rng(buffer, genre_key, &mut thread_rng())
}

pub fn apply_with_rng<R: Rng + ?Sized>(buffer: &SampleBuffer, genre_key: &str, rng: &mut R) -> SampleBuffer {
    let effect = OfflineEffect::parse(genre_key);
    debug!(genre = genre_key, branch = effect.label(), frames = buffer.frame_count(), "offline effect");
    apply_effect(buffer, effect, rng)
}

pub fn apply_effect<R: Rng + ?Sized>(buffer: &SampleBuffer, effect: OfflineEffect, rng: &mut R) -> SampleBuffer {
    let sample_rate = buffer.sample_rate() as f64;

    buffer.map_channels(|_, input, output| match effect {
        OfflineEffect::RnB => {
            let mut smoother = OnePole::new(0.2);
            for (o, &x) in output.iter_mut().zip(input) {
                let lp = smoother.next_sample(x);
                let warmth = saturate(lp, 1.5) * 0.3;
                *o = soft_knee(lp * 0.7 + warmth * 0.3, 0.8, 0.5);
            }
        }
        OfflineEffect::Edm => {
            for (i, (o, &x)) in output.iter_mut().zip(input).enumerate() {
                let t = i as f64 / sample_rate;
                let bright = x * 1.2;
                let punch = saturate(x, 2.0) * 0.3;
                let pump = (0.5 + 0.5 * (TAU * 4.0 * t - PI / 2.0).sin()) as f32;
                *o = (bright * 0.6 + punch * 0.4) * pump;
            }
        }
        OfflineEffect::HipHop => {
            for (i, (o, &x)) in output.iter_mut().zip(input).enumerate() {
                let t = i as f64 / sample_rate;
                let sub = (TAU * 60.0 * t).sin() as f32 * 0.3;
                let grit = white_noise(&mut *rng) * 0.05;
                *o = x * 0.7 + sub * 0.25 + grit * 0.05;
            }
        }
        OfflineEffect::Lofi => {
            let mut smoother = OnePole::new(0.15);
            for (o, &x) in output.iter_mut().zip(input) {
                let crushed = quantize(smoother.next_sample(x), 6);
                let crackle = white_noise(&mut *rng) * 0.03;
                *o = crushed * 0.85 + crackle * 0.15;
            }
        }
        OfflineEffect::Enhance => {
            for (o, &x) in output.iter_mut().zip(input) {
                *o = x * 0.9 + saturate(x, 1.2) * 0.1 * 0.1;
            }
        }
    })
}
