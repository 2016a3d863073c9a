//! Benchmarks for prompt analysis and pattern synthesis.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use remix_studio::synth::{analyze_prompt, Synthesizer, VoiceProfile};

use crate::SAMPLE_RATE;

const PROMPTS: &[(&str, &str)] = &[
    ("short", "lofi"),
    ("medium", "chill lofi beat with vinyl"),
    ("long", "aggressive trap banger with heavy 808 bass and fast hats at 150 bpm"),
];

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");
    group.sample_size(20);

    let Ok(synth) = Synthesizer::new(SAMPLE_RATE) else {
        return;
    };
    let voice = VoiceProfile::for_key("Female RnB");

    for &(name, prompt) in PROMPTS {
        group.bench_with_input(BenchmarkId::new("analyze", name), &prompt, |b, &prompt| {
            b.iter(|| analyze_prompt(black_box(prompt)))
        });

        let analysis = analyze_prompt(prompt);
        group.bench_with_input(BenchmarkId::new("synthesize", name), &prompt, |b, &prompt| {
            b.iter(|| synth.synthesize(black_box(prompt), voice, &analysis))
        });
    }

    group.finish();
}
