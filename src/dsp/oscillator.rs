use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;

/*
Stateless Oscillators
=====================

Offline synthesis addresses every sample by absolute time, so the waveforms
here are pure functions of `(t, frequency)` rather than phase accumulators.
That keeps a rendered pattern identical no matter how it is chunked.

  phase  = frac(t * frequency)          in [0, 1)

  sine      sin(2π·phase)
  square    +1 for the first half cycle, -1 for the second
  sawtooth  2·phase - 1                 ramps -1 → +1
  triangle  1 - 4·|phase - 0.5|         -1 → +1 → -1

The pattern synthesizer does not use a single waveform. It blends three
slightly detuned partials so the tone picks up movement:

  blend = sin(2πft)·(1-h)
        + sign(sin(2πft·1.01))·h/2
        + saw(t·f·1.02)·h/2

where `h` is the voice's harmonic weight. Note `sign(0) = 0`, so the
square partial is silent exactly at zero crossings.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    /// Bipolar, -1 to 1, centred like the other shapes. This is not the
    /// unipolar `|saw|` shape some browser sketches use, so a sketch
    /// voiced with it has no DC offset.
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Amplitude in [-1, 1] at time `t` seconds.
    #[inline]
    pub fn value_at(self, t: f64, frequency: f64) -> f64 {
        let phase = (t * frequency).rem_euclid(1.0);
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Sign with `sign(0) == 0`.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Three-partial blend used by the pattern synthesizer.
#[inline]
pub fn blend(t: f64, frequency: f64, harmonic_weight: f64) -> f64 {
    let phase = TAU * frequency * t;
    let sine = phase.sin();
    let square = sign((phase * 1.01).sin());
    let saw = (t * frequency * 1.02).rem_euclid(1.0) * 2.0 - 1.0;

    sine * (1.0 - harmonic_weight) + square * harmonic_weight / 2.0 + saw * harmonic_weight / 2.0
}

/// Uniform white noise in [-1, 1).
#[inline]
pub fn white_noise<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-1.0f32..1.0)
}
