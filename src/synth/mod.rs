//! Text-to-audio synthesis: prompt analysis, voices, repeating ADSR patterns
//! and the renderers that turn them into sample buffers.

pub mod analysis;
pub mod pattern;
pub mod renderer;
pub mod sketch;
pub mod voice;

pub use analysis::{analyze_prompt, Mood, PromptAnalysis};
pub use pattern::{patterns_for_prompt, word_count, Pattern};
pub use renderer::Synthesizer;
pub use sketch::{render_sketch, SketchParams};
pub use voice::{find_matching_voice, Gender, SystemVoice, VoiceProfile};

/// Lowest rate a clip can be rendered at.
pub const MIN_SAMPLE_RATE: u32 = 3_000;
/// Highest rate a clip can be rendered at.
pub const MAX_SAMPLE_RATE: u32 = 768_000;
/// Length of a synthesized clip in seconds.
pub const RENDER_SECONDS: f64 = 4.0;
