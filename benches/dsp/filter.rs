//! Benchmarks for biquad filtering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use remix_studio::dsp::filter::{Biquad, FilterType};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let sr = SAMPLE_RATE as f32;

    let kinds = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::LowShelf,
        FilterType::Peaking,
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffer = input.clone();

        for kind in kinds {
            let mut filter = Biquad::new(kind, 1_000.0, 1.0, 4.0, sr);
            group.bench_with_input(BenchmarkId::new(kind.label(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
