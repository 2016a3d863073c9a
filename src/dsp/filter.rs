use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Biquad Equalizer Filters
========================

Every tone-shaping stage in a genre chain is a second-order IIR ("biquad")
section. Coefficients follow the Audio EQ Cookbook; the sections run in
transposed direct form II, which keeps two state values per channel.

| type       | passes                | shapes                          |
| ---------- | --------------------- | ------------------------------- |
| low-pass   | below frequency       | rolls off above at 12 dB/oct    |
| high-pass  | above frequency       | rolls off below at 12 dB/oct    |
| low-shelf  | everything            | boosts/cuts below frequency     |
| high-shelf | everything            | boosts/cuts above frequency     |
| peaking    | everything            | bell of width Q around freq     |

Shelves use a shelf slope of 1 (alpha = sin(w0)/2 * sqrt(2)), so Q has no
effect on them. Pass filters and the peaking bell use Q directly; Q is
clamped to >= 0.5 so alpha never blows up.

The corner frequency is clamped to 45% of the sample rate. At very low
session rates a 8 kHz shelf would otherwise land on or past Nyquist, where the
poles sit on the unit circle.

  y[n] = b0*x[n] + z1
  z1   = b1*x[n] - a1*y[n] + z2
  z2   = b2*x[n] - a2*y[n]

One-Pole Smoother
-----------------

The offline processor's "warmth" stages use the simplest recursive lowpass:

  y[n] = y[n-1] * (1 - c) + x[n] * c

with c in (0, 1]. Small c means a darker, slower response.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    LowShelf,
    HighShelf,
    Peaking,
}

impl FilterType {
    pub fn label(self) -> &'static str {
        match self {
            FilterType::LowPass => "lowpass",
            FilterType::HighPass => "highpass",
            FilterType::LowShelf => "lowshelf",
            FilterType::HighShelf => "highshelf",
            FilterType::Peaking => "peaking",
        }
    }
}

/// Normalized biquad coefficients (a0 divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Identity section.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn design(filter_type: FilterType, frequency: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        if sample_rate <= 0.0 || !frequency.is_finite() {
            return Self::PASSTHROUGH;
        }

        let frequency = frequency.clamp(1.0, sample_rate * 0.45);
        let q = q.max(0.5);
        let omega = 2.0 * PI * frequency / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::LowPass => {
                let alpha = sin_omega / (2.0 * q);
                (
                    (1.0 - cos_omega) / 2.0,
                    1.0 - cos_omega,
                    (1.0 - cos_omega) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
            FilterType::HighPass => {
                let alpha = sin_omega / (2.0 * q);
                (
                    (1.0 + cos_omega) / 2.0,
                    -(1.0 + cos_omega),
                    (1.0 + cos_omega) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
            FilterType::Peaking => {
                let a = 10.0_f64.powf(gain_db / 40.0);
                let alpha = sin_omega / (2.0 * q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_omega,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_omega,
                    1.0 - alpha / a,
                )
            }
            FilterType::LowShelf => {
                let a = 10.0_f64.powf(gain_db / 40.0);
                let alpha = sin_omega / 2.0 * 2.0_f64.sqrt();
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha,
                )
            }
            FilterType::HighShelf => {
                let a = 10.0_f64.powf(gain_db / 40.0);
                let alpha = sin_omega / 2.0 * 2.0_f64.sqrt();
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha,
                )
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Linear magnitude of the frequency response at `frequency`.
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (c1, s1) = (w.cos(), w.sin());
        let (c2, s2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }
}

/// One biquad section with its design parameters, so the coefficients can
/// be recomputed when the render rate changes.
#[derive(Debug, Clone)]
pub struct Biquad {
    filter_type: FilterType,
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
    coeffs: BiquadCoeffs,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(filter_type: FilterType, frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self {
            filter_type,
            frequency,
            q,
            gain_db,
            sample_rate,
            coeffs: BiquadCoeffs::design(
                filter_type,
                frequency as f64,
                q as f64,
                gain_db as f64,
                sample_rate as f64,
            ),
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::LowPass, frequency, q, 0.0, sample_rate)
    }

    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::HighPass, frequency, q, 0.0, sample_rate)
    }

    pub fn low_shelf(frequency: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::LowShelf, frequency, 1.0, gain_db, sample_rate)
    }

    pub fn high_shelf(frequency: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::HighShelf, frequency, 1.0, gain_db, sample_rate)
    }

    pub fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::Peaking, frequency, q, gain_db, sample_rate)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Redesign for a new sample rate. No-op when the rate is unchanged.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if (sample_rate - self.sample_rate).abs() < f32::EPSILON {
            return;
        }
        self.sample_rate = sample_rate;
        self.coeffs = BiquadCoeffs::design(
            self.filter_type,
            self.frequency as f64,
            self.q as f64,
            self.gain_db as f64,
            sample_rate as f64,
        );
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 as f32 * x + self.z1;
        self.z1 = c.b1 as f32 * x - c.a1 as f32 * y + self.z2;
        self.z2 = c.b2 as f32 * x - c.a2 as f32 * y;
        y
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// First-order recursive smoother.
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    coef: f32,
    last: f32,
}

impl OnePole {
    pub fn new(coef: f32) -> Self {
        Self {
            coef: coef.clamp(0.0, 1.0),
            last: 0.0,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32) -> f32 {
        self.last = self.last * (1.0 - self.coef) + x * self.coef;
        self.last
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}
