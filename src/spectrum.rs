//! Frequency-bin snapshots of a live playback lane.
//!
//! The audio side owns a [`SpectrumTap`] and feeds it every block it plays;
//! the UI side holds the matching [`SpectrumHandle`] and asks for byte or
//! decibel magnitudes whenever it redraws. The FFT runs on the reading
//! thread, so the audio thread only copies samples into a ring.
//!
//! Readings follow the familiar analyser conventions: a Blackman window over
//! the most recent `fft_size` samples, magnitudes normalised by the transform
//! size, exponential smoothing between reads, and bytes mapped linearly from
//! [`MIN_DECIBELS`]..[`MAX_DECIBELS`] onto 0..255.

use std::{
    f32::consts::TAU,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, TryLockError,
    },
};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

pub const DEFAULT_FFT_SIZE: usize = 256;
pub const DEFAULT_SMOOTHING: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

/// Bar count used when no tap is available.
pub const SYNTHETIC_BARS: usize = 24;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32_768;

pub struct SpectrumAnalyzer {
    fft_size: usize,
    smoothing: f32,
    /// Blackman window coefficients
    window: Vec<f32>,
    /// Ring of the most recent input samples
    history: Vec<f32>,
    write_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes, one per bin
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// `fft_size` is rounded up to a power of two within 32..=32768 and
    /// `smoothing` is clamped to [0, 1].
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        let fft_size = fft_size.clamp(MIN_FFT_SIZE, MAX_FFT_SIZE).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
            })
            .collect();

        Self {
            fft_size,
            smoothing: if smoothing.is_finite() { smoothing.clamp(0.0, 1.0) } else { DEFAULT_SMOOTHING },
            window,
            history: vec![0.0; fft_size],
            write_pos: 0,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            magnitudes: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Centre frequency of bin `index` at `sample_rate`.
    pub fn bin_frequency(&self, index: usize, sample_rate: f32) -> f32 {
        index as f32 * sample_rate / self.fft_size as f32
    }

    /// Append samples to the analysis ring; only the last `fft_size` matter.
    pub fn push(&mut self, samples: &[f32]) {
        let n = self.fft_size;
        let samples = if samples.len() > n { &samples[samples.len() - n..] } else { samples };
        for &s in samples {
            self.history[self.write_pos] = if s.is_finite() { s } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % n;
        }
    }

    /// Run one transform over the ring and fold it into the smoothed bins.
    fn analyze(&mut self) {
        let n = self.fft_size;
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = self.history[(self.write_pos + i) % n];
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / n as f32;
        let tau = self.smoothing;
        for (m, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            let current = bin.norm() * scale;
            let smoothed = tau * *m + (1.0 - tau) * current;
            *m = if smoothed.is_finite() { smoothed } else { 0.0 };
        }
    }

    /// Byte magnitudes, one per bin, written into the front of `out`.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.analyze();
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (o, &m) in out.iter_mut().zip(&self.magnitudes) {
            let db = linear_to_db(m);
            let scaled = 255.0 * (db - MIN_DECIBELS) / range;
            *o = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    /// Decibel magnitudes, one per bin, written into the front of `out`.
    pub fn float_frequency_data(&mut self, out: &mut [f32]) {
        self.analyze();
        for (o, &m) in out.iter_mut().zip(&self.magnitudes) {
            *o = linear_to_db(m);
        }
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.magnitudes.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING)
    }
}

#[inline]
fn linear_to_db(m: f32) -> f32 {
    if m > 0.0 {
        20.0 * m.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Create a connected tap/handle pair sharing one analyser.
pub fn tap(fft_size: usize, smoothing: f32) -> (SpectrumTap, SpectrumHandle) {
    let shared = Arc::new(Mutex::new(SpectrumAnalyzer::new(fft_size, smoothing)));
    let live = Arc::new(AtomicBool::new(true));
    (
        SpectrumTap {
            shared: Arc::clone(&shared),
            live: Arc::clone(&live),
        },
        SpectrumHandle { shared, live },
    )
}

/// Audio-thread half. Dropping it marks the handle as no longer live.
pub struct SpectrumTap {
    shared: Arc<Mutex<SpectrumAnalyzer>>,
    live: Arc<AtomicBool>,
}

impl SpectrumTap {
    /// Copy a played block into the analyser. Never blocks: if a reader holds
    /// the lock the block is skipped.
    pub fn observe(&self, block: &[f32]) {
        match self.shared.try_lock() {
            Ok(mut analyzer) => analyzer.push(block),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().push(block),
            Err(TryLockError::WouldBlock) => {}
        }
    }
}

impl Drop for SpectrumTap {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}

/// Reader half, cheap to clone into the UI.
#[derive(Clone)]
pub struct SpectrumHandle {
    shared: Arc<Mutex<SpectrumAnalyzer>>,
    live: Arc<AtomicBool>,
}

impl std::fmt::Debug for SpectrumHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumHandle")
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

impl SpectrumHandle {
    fn lock(&self) -> MutexGuard<'_, SpectrumAnalyzer> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the audio side is still feeding this handle.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn bin_count(&self) -> usize {
        self.lock().bin_count()
    }

    /// Byte magnitudes for every bin.
    pub fn read(&self) -> Vec<u8> {
        let mut analyzer = self.lock();
        let mut out = vec![0; analyzer.bin_count()];
        analyzer.byte_frequency_data(&mut out);
        out
    }

    pub fn read_into(&self, out: &mut [u8]) {
        self.lock().byte_frequency_data(out);
    }

    pub fn read_decibels(&self) -> Vec<f32> {
        let mut analyzer = self.lock();
        let mut out = vec![0.0; analyzer.bin_count()];
        analyzer.float_frequency_data(&mut out);
        out
    }
}

/// Pick `count` bars out of a bin snapshot, bar `i` taking bin
/// `floor(i * len / count)`.
pub fn bars_from_bins(bins: &[u8], count: usize) -> Vec<u8> {
    if bins.is_empty() {
        return vec![0; count];
    }
    (0..count)
        .map(|i| bins[(i * bins.len() / count.max(1)).min(bins.len() - 1)])
        .collect()
}

/// Sine-driven stand-in bars for when no tap exists. Only meant to look
/// alive; it carries no information about the audio.
pub fn synthetic_bars(count: usize, time: f64) -> Vec<u8> {
    (0..count)
        .map(|i| {
            let phase = i as f64 * 0.2;
            let slow = (time * 5.0 + phase).sin();
            let fast = (time * 13.0 + phase * 6.5).sin();
            let level = 0.5 + 0.3 * slow + 0.15 * fast;
            (level.clamp(0.0, 1.0) * 255.0) as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin_tone(bin: usize, fft_size: usize, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (TAU * bin as f32 * i as f32 / fft_size as f32).sin())
            .collect()
    }

    #[test]
    fn default_size_gives_128_bins() {
        let analyzer = SpectrumAnalyzer::default();
        assert_eq!(analyzer.fft_size(), 256);
        assert_eq!(analyzer.bin_count(), 128);
        assert_eq!(SpectrumAnalyzer::new(300, 0.8).fft_size(), 512);
        assert_eq!(SpectrumAnalyzer::new(1, 0.8).fft_size(), 32);
    }

    #[test]
    fn tone_lands_in_its_bin() {
        let mut analyzer = SpectrumAnalyzer::default();
        analyzer.push(&bin_tone(16, 256, 256));

        let mut bins = [0u8; 128];
        analyzer.byte_frequency_data(&mut bins);
        assert_eq!(bins[16], 255);
        assert!(bins[100] < 10, "far bin leaked: {}", bins[100]);
    }

    #[test]
    fn silence_reads_zero() {
        let mut analyzer = SpectrumAnalyzer::default();
        analyzer.push(&[0.0; 512]);
        let mut bins = [7u8; 128];
        analyzer.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));

        let mut db = [0.0f32; 128];
        analyzer.float_frequency_data(&mut db);
        assert!(db.iter().all(|d| *d == f32::NEG_INFINITY));
    }

    #[test]
    fn smoothing_decays_gradually() {
        let mut analyzer = SpectrumAnalyzer::new(256, 0.8);
        analyzer.push(&bin_tone(8, 256, 256));
        let mut db = [0.0f32; 128];
        for _ in 0..10 {
            analyzer.float_frequency_data(&mut db);
        }
        let loud = db[8];

        analyzer.push(&[0.0; 256]);
        analyzer.float_frequency_data(&mut db);
        // One silent read keeps 80% of the magnitude, about -1.9 dB.
        assert!((db[8] - (loud + 20.0 * 0.8f32.log10())).abs() < 0.1);
    }

    #[test]
    fn handle_reads_what_the_tap_observes() {
        let (tap, handle) = tap(256, 0.0);
        assert!(handle.is_live());
        assert_eq!(handle.bin_count(), 128);

        tap.observe(&bin_tone(32, 256, 1_024));
        let bins = handle.read();
        assert_eq!(bins.len(), 128);
        assert_eq!(bins[32], 255);

        drop(tap);
        assert!(!handle.is_live());
    }

    #[test]
    fn bars_sample_bins_evenly() {
        let bins: Vec<u8> = (0..128).map(|i| i as u8).collect();
        let bars = bars_from_bins(&bins, 24);
        assert_eq!(bars.len(), 24);
        assert_eq!(bars[0], 0);
        assert_eq!(bars[1], 5);
        assert_eq!(bars[23], 122);
        assert_eq!(bars_from_bins(&[], 4), vec![0; 4]);
    }

    #[test]
    fn synthetic_bars_move() {
        let a = synthetic_bars(SYNTHETIC_BARS, 0.0);
        let b = synthetic_bars(SYNTHETIC_BARS, 0.25);
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
    }
}
