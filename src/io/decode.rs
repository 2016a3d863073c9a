use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use tracing::debug;

use crate::{buffer::SampleBuffer, error::DecodeError};

/// Decode a WAV stream into a planar float buffer.
///
/// Integer PCM (8 to 32 bits) is scaled by `2^(bits-1)`; 32-bit float is
/// taken as-is.
pub fn decode_wav<R: Read>(reader: R) -> Result<SampleBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(DecodeError::UnsupportedFormat {
                    bits: spec.bits_per_sample,
                    format: "float",
                });
            }
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Int => {
            if !(8..=32).contains(&spec.bits_per_sample) {
                return Err(DecodeError::UnsupportedFormat {
                    bits: spec.bits_per_sample,
                    format: "integer",
                });
            }
            let max_val = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = interleaved.len(),
        "decoded WAV"
    );

    Ok(SampleBuffer::from_interleaved(
        &interleaved,
        spec.channels as usize,
        spec.sample_rate,
    )?)
}

pub fn decode_file(path: impl AsRef<Path>) -> Result<SampleBuffer, DecodeError> {
    let file = File::open(path.as_ref()).map_err(hound::Error::IoError)?;
    decode_wav(BufReader::new(file))
}
