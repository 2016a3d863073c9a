//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. Everything here is a
//! memoryless transfer function `y = f(x)`; the only state is the lookup
//! table owned by [`WaveShaper`].
//!
//! # Transfer Functions
//!
//! Saturation (tanh):
//!   f(x) = tanh(drive * x)
//!   - Smooth, symmetric, never exceeds ±1
//!   - Used by the offline genre branches for "warmth"
//!
//! Soft knee:
//!   Linear below the knee, slope reduced above it
//!   - Gentle peak control without hard clipping
//!
//! Curve table (Web Audio style):
//!   A sampled curve spanning input -1..1, read with linear interpolation
//!   and held at the end points for inputs outside that range.
//!
//! Quantize:
//!   round(x * 2^bits) / 2^bits
//!   - Bit-crusher grit for lo-fi textures
//!
//! # The Phonk Curve
//!
//!   curve(x) = (3 + k) * x * 20° / (π + k * |x|)
//!
//! with `20°` in radians. `k` is the distortion amount; larger values push
//! the curve towards a square-ish plateau. For k = 50 the curve tops out
//! around ±0.35.

use std::f64::consts::PI;

/// Number of points in a default curve table.
pub const DEFAULT_CURVE_LEN: usize = 44_100;

#[inline]
pub fn saturate(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh()
}

/// Linear up to `threshold`, then continue with `slope` (mirrored for
/// negative input).
#[inline]
pub fn soft_knee(sample: f32, threshold: f32, slope: f32) -> f32 {
    if sample > threshold {
        threshold + (sample - threshold) * slope
    } else if sample < -threshold {
        -threshold + (sample + threshold) * slope
    } else {
        sample
    }
}

/// Round to a grid of `2^bits` steps per unit.
#[inline]
pub fn quantize(sample: f32, bits: u32) -> f32 {
    let steps = (1u64 << bits.min(24)) as f32;
    (sample * steps).round() / steps
}

/// Build the distortion curve for `amount` with `len` points.
pub fn distortion_curve(amount: f64, len: usize) -> Vec<f32> {
    let len = len.max(2);
    let deg = PI / 180.0;
    (0..len)
        .map(|i| {
            let x = i as f64 * 2.0 / len as f64 - 1.0;
            ((3.0 + amount) * x * 20.0 * deg / (PI + amount * x.abs())) as f32
        })
        .collect()
}

/// Table-driven waveshaper.
#[derive(Debug, Clone)]
pub struct WaveShaper {
    curve: Vec<f32>,
}

impl WaveShaper {
    pub fn new(curve: Vec<f32>) -> Self {
        Self { curve }
    }

    pub fn with_amount(amount: f64) -> Self {
        Self::new(distortion_curve(amount, DEFAULT_CURVE_LEN))
    }

    pub fn curve(&self) -> &[f32] {
        &self.curve
    }

    #[inline]
    pub fn shape(&self, sample: f32) -> f32 {
        let len = self.curve.len();
        match len {
            0 => return sample,
            1 => return self.curve[0],
            _ => {}
        }

        let last = len - 1;
        let v = (last as f32) * 0.5 * (sample + 1.0);
        if v <= 0.0 {
            return self.curve[0];
        }
        if v >= last as f32 {
            return self.curve[last];
        }

        let index = v.floor() as usize;
        let frac = v - index as f32;
        let a = self.curve[index];
        let b = self.curve[(index + 1).min(last)];
        a + (b - a) * frac
    }

    pub fn render(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.shape(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_knee_halves_slope_past_threshold() {
        assert_eq!(soft_knee(0.5, 0.8, 0.5), 0.5);
        assert!((soft_knee(1.0, 0.8, 0.5) - 0.9).abs() < 1e-6);
        assert!((soft_knee(-1.0, 0.8, 0.5) + 0.9).abs() < 1e-6);
    }

    #[test]
    fn quantize_snaps_to_grid() {
        assert_eq!(quantize(0.5, 6), 0.5);
        assert!((quantize(0.01, 6) - 1.0 / 64.0).abs() < 1e-7);
        assert_eq!(quantize(0.004, 6), 0.0);
    }

    #[test]
    fn curve_is_odd_and_bounded() {
        let curve = distortion_curve(50.0, 1001);
        let max = curve.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(max < 0.36 && max > 0.3, "peak {max}");
        assert!(curve[0] < 0.0);
        assert!(curve[1000] > 0.0);
    }

    #[test]
    fn shaper_interpolates_and_holds_ends() {
        let shaper = WaveShaper::new(vec![-1.0, 0.0, 1.0]);
        assert_eq!(shaper.shape(0.0), 0.0);
        assert!((shaper.shape(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(shaper.shape(2.0), 1.0);
        assert_eq!(shaper.shape(-3.0), -1.0);
    }

    #[test]
    fn phonk_shaper_stays_finite() {
        let shaper = WaveShaper::with_amount(50.0);
        assert_eq!(shaper.curve().len(), DEFAULT_CURVE_LEN);
        let mut block: Vec<f32> = (0..64).map(|i| (i as f32 / 32.0) - 1.0).collect();
        shaper.render(&mut block);
        assert!(block.iter().all(|s| s.is_finite() && s.abs() < 0.4));
    }
}
