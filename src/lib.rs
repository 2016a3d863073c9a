pub mod buffer; // Planar multi-channel sample buffers
pub mod config;
pub mod dsp;
pub mod engine; // Live session, playback retries, generation pipeline
pub mod error;
pub mod genre; // Genre names and effect-chain tables
pub mod graph; // Realtime effect nodes
pub mod io;
pub mod offline;
pub mod spectrum;
pub mod synth; // Prompt analysis and pattern synthesis

pub use buffer::SampleBuffer;
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Two seconds at 48 kHz.
pub const MAX_DELAY_SAMPLES: usize = 96_000;
