//! remix - prompt-driven clips and genre-coloured playback in the terminal
//!
//! Run with: cargo run --bin remix -- <command>

mod app;
mod ui;

use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::Level;

use remix_studio::{
    engine::{GenerateRequest, GenerationSource, Generator, HandleStore},
    genre::effects,
    synth::analyze_prompt,
    StudioConfig,
};

#[derive(Parser)]
#[command(name = "remix", version, about = "Generate and audition genre-styled clips")]
struct Cli {
    /// TOML file with studio settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show what a prompt is understood as
    Analyze {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// List the live effect chain of every genre
    Genres,
    /// Render a prompt to a WAV file
    Generate(GenerateArgs),
    /// Play a WAV file through a genre chain
    Play(PlayArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(required = true)]
    prompt: Vec<String>,

    #[arg(long, default_value = "default")]
    voice: String,

    /// Offline effect to apply instead of the detected genre's
    #[arg(long)]
    genre: Option<String>,

    /// Single-oscillator sketch instead of the pattern render
    #[arg(long)]
    sketch: bool,

    #[arg(short, long, default_value = "remix.wav")]
    output: PathBuf,

    /// Seed for the noise and waveform choices
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
pub struct PlayArgs {
    pub file: PathBuf,

    #[arg(long)]
    pub genre: Option<String>,

    /// Skip the spectrum tap and show synthetic bars
    #[arg(long)]
    pub no_tap: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    // The TUI owns the terminal while playing.
    if matches!(cli.command, Command::Play(_)) {
        tracing_subscriber::fmt().with_writer(io::sink).init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => {
            StudioConfig::load(path).wrap_err_with(|| format!("failed to load {}", path.display()))?
        }
        None => StudioConfig::default(),
    };
    config.validate().wrap_err("invalid studio config")?;

    match cli.command {
        Command::Analyze { prompt } => analyze(&prompt.join(" ")),
        Command::Genres => genres(),
        Command::Generate(args) => generate(config, args),
        Command::Play(args) => app::play(&config, &args),
    }
}

fn analyze(prompt: &str) -> EyreResult<()> {
    let analysis = analyze_prompt(prompt);
    println!("genre:      {}", analysis.genre);
    println!("mood:       {}", analysis.mood);
    println!("tempo:      {:.0} BPM", analysis.tempo);
    println!("intensity:  {:.2}", analysis.intensity);
    println!("base pitch: {:.1} Hz", analysis.base_frequency());
    if !analysis.emotional_tags.is_empty() {
        println!("tags:       {}", analysis.emotional_tags.join(", "));
    }
    if !analysis.elements.is_empty() {
        println!("elements:   {}", analysis.elements.join(", "));
    }
    Ok(())
}

fn genres() -> EyreResult<()> {
    for spec in effects::table() {
        let stages: Vec<&str> = spec.kinds().into_iter().map(|kind| kind.label()).collect();
        println!("{:<10} {:<32} {}", spec.name, spec.description, stages.join(" -> "));
    }
    Ok(())
}

fn generate(config: StudioConfig, args: GenerateArgs) -> EyreResult<()> {
    let mut request = GenerateRequest::new(args.prompt.join(" "))
        .voice(args.voice)
        .sketch(args.sketch);
    if let Some(genre) = args.genre {
        request = request.genre(genre);
    }

    let mut generator = match args.seed {
        Some(seed) => Generator::with_seed(config, seed),
        None => Generator::new(config),
    };
    let mut store = HandleStore::new();
    let generation = generator.generate(&request, &mut store)?;

    if let GenerationSource::Fallback { reason } = &generation.source {
        println!("synthesis failed: {reason}");
        println!("fallback asset:   {}", generation.handle);
        return Ok(());
    }

    let bytes = store
        .resolve(&generation.handle)
        .ok_or_else(|| eyre!("generated clip {} is missing", generation.handle))?;
    std::fs::write(&args.output, bytes)
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;
    store.release(&generation.handle);

    println!(
        "{} ({} / {}, {:.0} BPM, {} effect) -> {}",
        request.prompt,
        generation.analysis.genre,
        generation.analysis.mood,
        generation.analysis.tempo,
        generation.effect.label(),
        args.output.display()
    );
    Ok(())
}
