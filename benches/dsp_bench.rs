//! Benchmarks for DSP primitives and the studio pipelines.
//!
//! Run with: cargo bench
//!
//! Live stages must finish well inside the block deadline. Reference timing
//! at 48kHz sample rate:
//!   - 128 samples  = 2.67ms deadline
//!   - 512 samples  = 10.67ms deadline
//!   - 2048 samples = 42.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Biquad and compressor primitives
//!   - scenarios/*  Genre chains, offline effects, synthesis and encoding

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Block sizes seen from audio callbacks.
pub const BLOCK_SIZES: &[usize] = &[128, 512, 2048];

pub const SAMPLE_RATE: u32 = 48_000;

criterion_group!(
    benches,
    // Primitives
    dsp::bench_filter,
    dsp::bench_dynamics,
    // Pipelines
    scenarios::bench_chains,
    scenarios::bench_offline,
    scenarios::bench_synth,
    scenarios::bench_encode,
);
criterion_main!(benches);
