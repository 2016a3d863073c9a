//! Benchmarks for WAV encoding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use remix_studio::{io::wav, SampleBuffer};

use crate::SAMPLE_RATE;

pub fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/encode");

    for seconds in [1usize, 4] {
        let frames = SAMPLE_RATE as usize * seconds;
        let clip = SampleBuffer::from_channels(
            vec![(0..frames).map(|i| (i as f32 * 0.01).sin()).collect(); 2],
            SAMPLE_RATE,
        )
        .expect("valid clip");

        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::new("pcm16_stereo", seconds), &seconds, |b, _| {
            b.iter(|| wav::encode(black_box(&clip)))
        });
    }

    group.finish();
}
