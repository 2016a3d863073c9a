//! Offline Bounce
//!
//! Generates a clip from a prompt, then plays it through a live genre chain
//! inside an `AudioSession` without any audio device, and writes both the
//! dry clip and the bounced mix to WAV files.
//!
//! Run with: cargo run --example offline_bounce -- "dark trap beat at 140 bpm" phonk

use color_eyre::eyre::{eyre, WrapErr};
use remix_studio::{
    engine::{AudioSession, GenerateRequest, Generator, HandleStore},
    io::{decode_wav, wav},
    SampleBuffer, StudioConfig, MAX_BLOCK_SIZE,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| "chill lofi beat with soft piano".into());
    let genre = args.next().unwrap_or_else(|| "lofi".into());

    // === GENERATE ===
    let config = StudioConfig::default();
    let mut generator = Generator::with_seed(config.clone(), 2024);
    let mut store = HandleStore::new();
    let generation = generator.generate(&GenerateRequest::new(prompt.as_str()), &mut store)?;
    println!(
        "Prompt: {prompt}\n  genre {} / mood {} / {:.0} BPM",
        generation.analysis.genre, generation.analysis.mood, generation.analysis.tempo
    );

    let bytes = store
        .resolve(&generation.handle)
        .ok_or_else(|| eyre!("generation fell back to {}", generation.handle))?;
    std::fs::write("dry.wav", bytes).wrap_err("failed to write dry.wav")?;
    let clip = decode_wav(bytes).wrap_err("failed to read back the clip")?;

    // === BOUNCE ===
    // Same path the live player takes, pulled block by block
    let mut session = AudioSession::with_config(&config, clip.sample_rate(), 2)?;
    let id = session.load(&clip)?;
    let spec = session.attach_genre(id, &genre)?;
    session.play(id)?;
    println!("Chain: {} ({})", spec.name, spec.description);

    let mut interleaved = Vec::with_capacity(clip.frame_count() * 2);
    let mut block = vec![0.0f32; MAX_BLOCK_SIZE * 2];
    while !session.is_finished(id)? {
        session.render(&mut block);
        interleaved.extend_from_slice(&block);
    }

    let bounced = SampleBuffer::from_interleaved(&interleaved, 2, clip.sample_rate())?;
    std::fs::write("bounced.wav", wav::encode(&bounced)).wrap_err("failed to write bounced.wav")?;
    store.release(&generation.handle);

    println!(
        "Wrote dry.wav (peak {:.3}) and bounced.wav (peak {:.3}, {:.2}s)",
        clip.peak(),
        bounced.peak(),
        bounced.duration()
    );
    Ok(())
}
