#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Time-Addressed ADSR Envelope
============================

Patterns are rendered offline, so the envelope does not need a gate-driven
state machine. Instead it is a pure function of the time elapsed since the
note window opened:

    level = adsr.level_at(t, duration)

Vocabulary
----------

  duration    Length of one note window in seconds. The envelope is zero
              outside [0, duration).

  sustain     Time left over after attack, decay and release:
              sustain = duration - attack - decay - release

The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ t
        Attack Decay  Sustain  Release
                                     ↑ duration

  attack   0 → 1          over `attack` seconds
  decay    1 → S          over `decay` seconds
  sustain  S              for whatever time remains
  release  S → 0          over `release` seconds, ending at `duration`

Fitting Into the Window
-----------------------

If attack + decay + release exceeds the window, the three ramps are scaled
down by the same factor until they fit exactly. Sustain time is therefore
never negative and the release always finishes at the window edge. Phases of
zero length are skipped: a zero attack starts at full level.
*/

/// Which part of the envelope a given instant falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // outside the window, level = 0
    Attack,  // ramping up to 1.0
    Decay,   // ramping down to sustain level
    Sustain, // holding at sustain level
    Release, // ramping down to 0 at the window edge
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain_level: f64,
    pub release: f64,
}

impl Adsr {
    /// Negative times become zero and the sustain level is clamped to [0, 1].
    pub fn new(attack: f64, decay: f64, sustain_level: f64, release: f64) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain_level: sustain_level.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Scale attack, decay and release so they fit inside `duration`.
    pub fn fitted(self, duration: f64) -> Self {
        let ramps = self.attack + self.decay + self.release;
        if ramps <= duration || ramps <= 0.0 {
            return self;
        }

        let scale = duration.max(0.0) / ramps;
        Self {
            attack: self.attack * scale,
            decay: self.decay * scale,
            release: self.release * scale,
            ..self
        }
    }

    pub fn sustain_time(&self, duration: f64) -> f64 {
        (duration - self.attack - self.decay - self.release).max(0.0)
    }

    pub fn stage_at(&self, t: f64, duration: f64) -> EnvelopeStage {
        if t < 0.0 || t >= duration {
            return EnvelopeStage::Idle;
        }

        let decay_end = self.attack + self.decay;
        let sustain_end = decay_end + self.sustain_time(duration);

        if t < self.attack {
            EnvelopeStage::Attack
        } else if t < decay_end {
            EnvelopeStage::Decay
        } else if t < sustain_end {
            EnvelopeStage::Sustain
        } else {
            EnvelopeStage::Release
        }
    }

    /// Envelope level `t` seconds after the window opened. Assumes the
    /// envelope was fitted to `duration`.
    pub fn level_at(&self, t: f64, duration: f64) -> f64 {
        match self.stage_at(t, duration) {
            EnvelopeStage::Idle => 0.0,
            EnvelopeStage::Attack => t / self.attack,
            EnvelopeStage::Decay => {
                let progress = (t - self.attack) / self.decay;
                1.0 - (1.0 - self.sustain_level) * progress
            }
            EnvelopeStage::Sustain => self.sustain_level,
            EnvelopeStage::Release => {
                if self.release <= 0.0 {
                    return 0.0;
                }
                let release_start = duration - self.release;
                let progress = (t - release_start) / self.release;
                (self.sustain_level * (1.0 - progress)).max(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody() -> Adsr {
        Adsr::new(0.05, 0.1, 0.6, 0.2)
    }

    #[test]
    fn follows_linear_shape() {
        let env = melody();
        let dur = 4.0;

        assert_eq!(env.level_at(0.0, dur), 0.0);
        assert!((env.level_at(0.025, dur) - 0.5).abs() < 1e-9);
        assert!((env.level_at(0.05, dur) - 1.0).abs() < 1e-9);
        assert!((env.level_at(0.1, dur) - 0.8).abs() < 1e-9);
        assert!((env.level_at(0.15, dur) - 0.6).abs() < 1e-9);
        assert!((env.level_at(2.0, dur) - 0.6).abs() < 1e-9);
        assert!((env.level_at(3.9, dur) - 0.3).abs() < 1e-9);
        assert_eq!(env.level_at(4.0, dur), 0.0);
        assert_eq!(env.level_at(-0.1, dur), 0.0);
    }

    #[test]
    fn reports_stages() {
        let env = melody();
        assert_eq!(env.stage_at(0.01, 4.0), EnvelopeStage::Attack);
        assert_eq!(env.stage_at(0.1, 4.0), EnvelopeStage::Decay);
        assert_eq!(env.stage_at(1.0, 4.0), EnvelopeStage::Sustain);
        assert_eq!(env.stage_at(3.85, 4.0), EnvelopeStage::Release);
        assert_eq!(env.stage_at(5.0, 4.0), EnvelopeStage::Idle);
    }

    #[test]
    fn oversized_ramps_are_fitted() {
        let env = Adsr::new(1.0, 1.0, 0.5, 2.0).fitted(2.0);

        assert!((env.attack + env.decay + env.release - 2.0).abs() < 1e-9);
        assert_eq!(env.sustain_time(2.0), 0.0);
        assert!((env.attack - 0.5).abs() < 1e-9);

        for i in 0..200 {
            let level = env.level_at(i as f64 * 0.01, 2.0);
            assert!((0.0..=1.0).contains(&level), "level {level} out of range");
        }
    }

    #[test]
    fn zero_attack_starts_at_full_level() {
        let env = Adsr::new(0.0, 0.1, 0.5, 0.1);
        assert_eq!(env.stage_at(0.0, 1.0), EnvelopeStage::Decay);
        assert!((env.level_at(0.0, 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parameters_are_sanitized() {
        let env = Adsr::new(-1.0, 0.1, 3.0, -0.5);
        assert_eq!(env.attack, 0.0);
        assert_eq!(env.release, 0.0);
        assert_eq!(env.sustain_level, 1.0);
    }
}
