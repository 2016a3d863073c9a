//! Genre Tour
//!
//! Runs one second of a two-tone test signal through every genre's live
//! chain and prints the stages and how the level changes. Handy for
//! eyeballing the chain table after editing it.
//!
//! Run with: cargo run --example genre_tour

use std::f32::consts::TAU;

use remix_studio::{
    genre::{effects, Genre},
    graph::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

fn rms(buffer: &[f32]) -> f32 {
    (buffer.iter().map(|x| x * x).sum::<f32>() / buffer.len().max(1) as f32).sqrt()
}

fn main() {
    println!("=== Genre Tour ===\n");

    let sample_rate = 48_000.0;
    // 80 Hz body plus a 5 kHz edge, so shelves and filters both show up
    let signal: Vec<f32> = (0..sample_rate as usize)
        .map(|i| {
            let t = i as f32 / sample_rate;
            0.4 * (TAU * 80.0 * t).sin() + 0.2 * (TAU * 5_000.0 * t).sin()
        })
        .collect();
    let dry = rms(&signal);

    for genre in Genre::ALL {
        let spec = effects::effect_spec(genre);
        let mut chain = spec.build();
        let mut wet = signal.clone();

        let ctx = RenderCtx::new(sample_rate);
        for block in wet.chunks_mut(MAX_BLOCK_SIZE) {
            chain.render_block(block, &ctx);
        }

        let change_db = 20.0 * (rms(&wet) / dry).max(1e-6).log10();
        println!("{:<10} {:>+6.1} dB  {}", spec.name, change_db, chain.labels().join(" -> "));
    }
}
