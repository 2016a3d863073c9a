//! Feed-forward compressor with a soft knee.
//!
//! Parameters mirror a browser dynamics compressor: threshold and knee in
//! dB, ratio as N:1, attack and release in seconds. Detection is a peak
//! envelope follower; gain reduction is computed in the dB domain with a
//! quadratic knee.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorParams {
    pub threshold_db: f64,
    pub knee_db: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compressor {
    params: CompressorParams,
    sample_rate: f64,
    attack_coef: f64,
    release_coef: f64,
    envelope: f64,
}

#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

impl Compressor {
    pub fn new(params: CompressorParams, sample_rate: f64) -> Self {
        let params = CompressorParams {
            threshold_db: params.threshold_db.clamp(-100.0, 0.0),
            knee_db: params.knee_db.clamp(0.0, 40.0),
            ratio: params.ratio.clamp(1.0, 20.0),
            attack: params.attack.clamp(0.0001, 1.0),
            release: params.release.clamp(0.001, 5.0),
        };

        let mut compressor = Self {
            params,
            sample_rate,
            attack_coef: 0.0,
            release_coef: 0.0,
            envelope: 0.0,
        };
        compressor.update_coefficients();
        compressor
    }

    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if (sample_rate - self.sample_rate).abs() > f64::EPSILON {
            self.sample_rate = sample_rate;
            self.update_coefficients();
        }
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate.max(1.0);
        self.attack_coef = (-1.0 / (self.params.attack * sr)).exp();
        self.release_coef = (-1.0 / (self.params.release * sr)).exp();
    }

    /// Gain change in dB (zero or negative) for a detector level in dB.
    pub fn gain_reduction_db(&self, input_db: f64) -> f64 {
        let CompressorParams {
            threshold_db,
            knee_db,
            ratio,
            ..
        } = self.params;
        let slope = 1.0 - 1.0 / ratio;

        if knee_db <= 0.0 {
            if input_db <= threshold_db {
                0.0
            } else {
                (threshold_db - input_db) * slope
            }
        } else {
            let half_knee = knee_db / 2.0;
            let knee_start = threshold_db - half_knee;
            let knee_end = threshold_db + half_knee;

            if input_db <= knee_start {
                0.0
            } else if input_db >= knee_end {
                (threshold_db - input_db) * slope
            } else {
                let x = input_db - knee_start;
                -slope * x * x / (2.0 * knee_db)
            }
        }
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let level = sample.abs() as f64;
        let coef = if level > self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * level;

        let gain = db_to_linear(self.gain_reduction_db(linear_to_db(self.envelope)));
        sample * gain as f32
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
