//! Benchmarks for the feed-forward compressor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use remix_studio::dsp::dynamics::{Compressor, CompressorParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_dynamics(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/dynamics");

    for &size in BLOCK_SIZES {
        // Loud enough to sit above threshold most of the time
        let input: Vec<f32> = (0..size).map(|i| 0.9 * (i as f32 * 0.02).sin()).collect();
        let mut buffer = input.clone();

        let mut compressor = Compressor::new(CompressorParams::default(), SAMPLE_RATE as f64);
        group.bench_with_input(BenchmarkId::new("compressor", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                compressor.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
