//! Low-level DSP primitives used by the graph nodes and the offline processor.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can sit directly inside graph nodes. They stay focused on the
//! signal-processing math; orchestration lives in `graph` and `engine`.

/// Ring-buffer delay line.
pub mod delay;
/// Waveshaping, saturation and bit-depth reduction.
pub mod distortion;
/// Feed-forward soft-knee dynamics compressor.
pub mod dynamics;
/// Time-addressed ADSR envelope shape.
pub mod envelope;
/// Cookbook biquads and the one-pole smoother.
pub mod filter;
/// Oscillator waveforms and noise sources.
pub mod oscillator;

pub use envelope::{Adsr, EnvelopeStage};
pub use filter::{Biquad, FilterType, OnePole};
pub use oscillator::Waveform;
