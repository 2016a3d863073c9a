// Purpose - external interfaces, container formats

/// hound-backed WAV decoding for user-loaded files.
pub mod decode;
/// 16-bit PCM RIFF/WAVE encoding.
pub mod wav;

pub use decode::{decode_file, decode_wav};
pub use wav::{encode, try_encode};
