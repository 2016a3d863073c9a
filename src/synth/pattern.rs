#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::Adsr;

/*
Repeating Note Patterns
=======================

A pattern is one partial of the generated phrase: a frequency ratio against
the base pitch, a level, and an ADSR note that re-triggers on a fixed grid.

    start      first trigger, seconds into the clip
    repeat     trigger spacing
    duration   length of each note window

Repetition k (0 <= k < floor((T - start) / repeat), T = clip length) covers

    [start + k*repeat, start + k*repeat + duration)

Windows may overlap when duration > repeat. The notes do not stack: at any
instant the earliest window still open decides the envelope level. A melody
with a 4 s window and a 0.5 s grid therefore plays as one long note, while a
3.75 s window on a 0.25 s grid keeps re-triggering only near the clip's end
once the earlier windows have closed.

    k=0  [=========)
    k=1     [=========)
    k=2        [=========)
         ^ k=0 governs until it closes, then k=1, ...
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    pub frequency_ratio: f64,
    pub amplitude: f64,
    pub envelope: Adsr,
    pub start_time: f64,
    pub duration: f64,
    pub repeat_interval: f64,
}

const MIN_SPAN: f64 = 1e-3;

impl Pattern {
    /// Out-of-range values are clamped: amplitude into [0, 1], times to be
    /// non-negative (spans strictly positive), and the envelope fitted into
    /// `duration`.
    pub fn new(
        frequency_ratio: f64,
        amplitude: f64,
        envelope: Adsr,
        start_time: f64,
        duration: f64,
        repeat_interval: f64,
    ) -> Self {
        let duration = duration.max(MIN_SPAN);
        Self {
            frequency_ratio: frequency_ratio.max(f64::EPSILON),
            amplitude: amplitude.clamp(0.0, 1.0),
            envelope: envelope.fitted(duration),
            start_time: start_time.max(0.0),
            duration,
            repeat_interval: repeat_interval.max(MIN_SPAN),
        }
    }

    /// Number of triggers inside a clip of `total` seconds.
    pub fn repetitions(&self, total: f64) -> usize {
        ((total - self.start_time) / self.repeat_interval).floor().max(0.0) as usize
    }

    /// Start of the earliest window that contains `t`, if any.
    pub fn active_window(&self, t: f64, total: f64) -> Option<f64> {
        let reps = self.repetitions(total);
        let since_close = t - self.start_time - self.duration;
        let first_open = if since_close < 0.0 {
            0
        } else {
            (since_close / self.repeat_interval).floor() as usize + 1
        };

        // Step back one slot to absorb rounding in the division above.
        for k in first_open.saturating_sub(1)..reps {
            let window_start = self.start_time + k as f64 * self.repeat_interval;
            if t < window_start {
                return None;
            }
            if t < window_start + self.duration {
                return Some(window_start);
            }
        }
        None
    }

    /// Envelope level at clip time `t`; zero outside every window.
    pub fn envelope_at(&self, t: f64, total: f64) -> f64 {
        match self.active_window(t, total) {
            Some(window_start) => self.envelope.level_at(t - window_start, self.duration),
            None => 0.0,
        }
    }
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Pattern set for a prompt: melody and an intensity layer always, a fifth
/// above for more than three words, a bass octave for more than five.
pub fn patterns_for_prompt(text: &str, intensity: f64) -> Vec<Pattern> {
    let words = word_count(text);
    let mut patterns = Vec::with_capacity(4);

    // melody
    patterns.push(Pattern::new(1.0, 0.7, Adsr::new(0.05, 0.1, 0.6, 0.2), 0.0, 4.0, 0.5));

    if words > 3 {
        // perfect fifth
        patterns.push(Pattern::new(1.5, 0.4, Adsr::new(0.1, 0.2, 0.3, 0.3), 0.25, 3.5, 1.0));
    }

    if words > 5 {
        // octave down
        patterns.push(Pattern::new(0.5, 0.5, Adsr::new(0.15, 0.3, 0.4, 0.4), 0.5, 3.0, 1.5));
    }

    patterns.push(Pattern::new(
        2.0,
        intensity.clamp(0.0, 1.0) * 0.5,
        Adsr::new(0.02, 0.1, 0.2, 0.1),
        0.125,
        3.75,
        0.25,
    ));

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_count_follows_word_count() {
        assert_eq!(patterns_for_prompt("a", 0.5).len(), 2);
        assert_eq!(patterns_for_prompt("one two three four", 0.5).len(), 3);
        assert_eq!(patterns_for_prompt("one two three four five six", 0.5).len(), 4);
        assert_eq!(patterns_for_prompt("", 0.5).len(), 2);
    }

    #[test]
    fn intensity_layer_scales_with_intensity() {
        let patterns = patterns_for_prompt("a", 0.8);
        let layer = patterns.last().unwrap();
        assert_eq!(layer.frequency_ratio, 2.0);
        assert!((layer.amplitude - 0.4).abs() < 1e-12);
    }

    #[test]
    fn melody_envelope_shape() {
        let melody = patterns_for_prompt("a", 0.5)[0];
        let total = 4.0;
        assert_eq!(melody.envelope_at(0.0, total), 0.0);
        assert!((melody.envelope_at(0.025, total) - 0.5).abs() < 1e-9);
        assert!((melody.envelope_at(0.05, total) - 1.0).abs() < 1e-9);
        assert!((melody.envelope_at(0.1, total) - 0.8).abs() < 1e-9);
        assert!((melody.envelope_at(2.0, total) - 0.6).abs() < 1e-9);
        assert!((melody.envelope_at(3.9, total) - 0.3).abs() < 1e-9);
        // The first window closes at the clip edge and the second takes over.
        assert_eq!(melody.active_window(4.0, total), Some(0.5));
    }

    #[test]
    fn earliest_window_governs() {
        // 1 s windows every 0.5 s: at t = 0.75 both k=0 and k=1 are open.
        let p = Pattern::new(1.0, 1.0, Adsr::new(0.1, 0.0, 1.0, 0.1), 0.0, 1.0, 0.5);
        assert_eq!(p.active_window(0.75, 4.0), Some(0.0));
        assert_eq!(p.active_window(1.0, 4.0), Some(0.5));
        assert_eq!(p.active_window(1.6, 4.0), Some(1.0));
    }

    #[test]
    fn no_windows_past_the_last_repetition() {
        let p = Pattern::new(1.0, 1.0, Adsr::new(0.0, 0.0, 1.0, 0.0), 0.5, 0.2, 1.0);
        assert_eq!(p.repetitions(4.0), 3);
        assert!(p.active_window(0.4, 4.0).is_none());
        assert_eq!(p.active_window(2.6, 4.0), Some(2.5));
        assert!(p.active_window(2.8, 4.0).is_none());
        assert!(p.active_window(3.55, 4.0).is_none());
    }

    #[test]
    fn oversized_envelopes_are_fitted() {
        let p = Pattern::new(1.0, 2.0, Adsr::new(1.0, 1.0, 0.5, 2.0), -1.0, 2.0, 0.0);
        assert_eq!(p.amplitude, 1.0);
        assert_eq!(p.start_time, 0.0);
        assert!(p.repeat_interval > 0.0);
        let env = p.envelope;
        assert!((env.attack + env.decay + env.release - 2.0).abs() < 1e-12);
        assert_eq!(env.sustain_time(p.duration), 0.0);
    }
}
