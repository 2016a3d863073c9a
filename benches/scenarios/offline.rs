//! Benchmarks for the offline genre effects on a four-second clip.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use remix_studio::{
    offline::{apply_effect, OfflineEffect},
    SampleBuffer,
};

use crate::SAMPLE_RATE;

pub fn bench_offline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/offline");
    group.sample_size(20);

    let frames = SAMPLE_RATE as usize * 4;
    let clip = SampleBuffer::from_channels(
        vec![(0..frames).map(|i| (i as f32 * 0.02).sin() * 0.6).collect(); 2],
        SAMPLE_RATE,
    )
    .expect("valid clip");

    let effects = [
        OfflineEffect::RnB,
        OfflineEffect::Edm,
        OfflineEffect::HipHop,
        OfflineEffect::Lofi,
        OfflineEffect::Enhance,
    ];

    for effect in effects {
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_with_input(BenchmarkId::new(effect.label(), frames), &frames, |b, _| {
            b.iter(|| apply_effect(black_box(&clip), effect, &mut rng))
        });
    }

    group.finish();
}
