//! Benchmarks for the live genre chains and a multi-source session.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use remix_studio::{
    engine::AudioSession,
    genre::{effects, Genre},
    graph::node::{GraphNode, RenderCtx},
    SampleBuffer,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chains");
    let ctx = RenderCtx::new(SAMPLE_RATE as f32);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| 0.5 * (i as f32 * 0.03).sin()).collect();
        let mut buffer = input.clone();

        for genre in Genre::ALL {
            let mut chain = effects::effect_spec(genre).build();
            group.bench_with_input(BenchmarkId::new(genre.label(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    chain.render_block(black_box(&mut buffer), &ctx);
                })
            });
        }
    }

    // Four stereo sources, each with its own chain, into a stereo device
    let clip = SampleBuffer::from_channels(
        vec![(0..SAMPLE_RATE as usize * 4).map(|i| (i as f32 * 0.01).sin() * 0.4).collect(); 2],
        SAMPLE_RATE,
    )
    .expect("valid clip");

    for &size in BLOCK_SIZES {
        let Ok(mut session) = AudioSession::open(SAMPLE_RATE, 2) else {
            continue;
        };
        for genre in ["edm", "lofi", "trap", "phonk"] {
            let id = session.load(&clip).expect("load");
            session.attach_genre(id, genre).expect("attach");
            session.play(id).expect("play");
        }
        let mut out = vec![0.0f32; size * 2];

        group.bench_with_input(BenchmarkId::new("session_4_sources", size), &size, |b, _| {
            b.iter(|| {
                session.render(black_box(&mut out));
                // Loop the clips so the bench never runs dry
                for id in session.source_ids().collect::<Vec<_>>() {
                    if session.is_finished(id).unwrap_or(false) {
                        let _ = session.restart(id);
                    }
                }
            })
        });
    }

    group.finish();
}
