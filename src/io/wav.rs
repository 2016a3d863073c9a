//! RIFF/WAVE container encoding for finished sample buffers.
//!
//! Only one format is ever emitted: uncompressed 16-bit little-endian PCM
//! behind the canonical 44-byte header.
//!
//! ```text
//!  offset  size  field
//!       0     4  "RIFF"
//!       4     4  36 + data size
//!       8     4  "WAVE"
//!      12     4  "fmt "
//!      16     4  16 (fmt chunk size)
//!      20     2  1 (PCM)
//!      22     2  channels
//!      24     4  sample rate
//!      28     4  byte rate = rate * block align
//!      32     2  block align = channels * 2
//!      34     2  16 (bits per sample)
//!      36     4  "data"
//!      40     4  data size = frames * channels * 2
//!      44        interleaved i16 samples
//! ```
//!
//! [`encode`] never fails: if the buffer cannot be represented (too many
//! channels, payload over 4 GiB) it logs and returns a one-second 440 Hz
//! tone so callers always get something playable.

use std::f64::consts::TAU;

use tracing::warn;

use crate::{buffer::SampleBuffer, error::EncodeError};

pub const HEADER_LEN: usize = 44;
pub const BITS_PER_SAMPLE: u16 = 16;

const FALLBACK_RATE: u32 = 44_100;
const FALLBACK_FREQUENCY: f64 = 440.0;

/// Format fields of the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    pub fn pcm16(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }

    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(self.block_align()? as u32)
    }
}

/// Convert one float sample to 16-bit PCM.
///
/// Clamped to [-1, 1]; negative values scale by 32768 and non-negative by
/// 32767 so both extremes are reachable. The result is truncated toward zero.
#[inline]
pub fn sample_to_pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32_768.0) as i16
    } else {
        (s * 32_767.0) as i16
    }
}

fn write_header(out: &mut Vec<u8>, format: &WavFormat, byte_rate: u32, block_align: u16, data_size: u32) {
    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
}

/// Encode, reporting why the buffer cannot be represented.
pub fn try_encode(buffer: &SampleBuffer) -> Result<Vec<u8>, EncodeError> {
    let channels = buffer.channel_count();
    let channel_count =
        u16::try_from(channels).map_err(|_| EncodeError::TooManyChannels { channels })?;
    let format = WavFormat::pcm16(channel_count, buffer.sample_rate());

    let block_align = format
        .block_align()
        .ok_or(EncodeError::TooManyChannels { channels })?;
    let byte_rate = format.byte_rate().ok_or(EncodeError::ByteRateOverflow {
        sample_rate: format.sample_rate,
        block_align,
    })?;

    let frames = buffer.frame_count();
    let bytes = frames as u64 * block_align as u64;
    let data_size = u32::try_from(bytes)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or(EncodeError::TooLarge { bytes })?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_size as usize);
    write_header(&mut out, &format, byte_rate, block_align, data_size);

    let channel_data: Vec<&[f32]> = buffer.channels().collect();
    for frame in 0..frames {
        for data in &channel_data {
            out.extend_from_slice(&sample_to_pcm16(data[frame]).to_le_bytes());
        }
    }

    Ok(out)
}

/// Encode a buffer, substituting the fallback tone on failure.
pub fn encode(buffer: &SampleBuffer) -> Vec<u8> {
    match try_encode(buffer) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "WAV encoding failed, emitting fallback tone");
            fallback_wav()
        }
    }
}

/// One second of mono 440 Hz at half scale, 44.1 kHz.
pub fn fallback_wav() -> Vec<u8> {
    let format = WavFormat::pcm16(1, FALLBACK_RATE);
    let block_align = 2u16;
    let data_size = FALLBACK_RATE * block_align as u32;

    let mut out = Vec::with_capacity(HEADER_LEN + data_size as usize);
    write_header(&mut out, &format, FALLBACK_RATE * 2, block_align, data_size);

    for i in 0..FALLBACK_RATE {
        let t = i as f64 / FALLBACK_RATE as f64;
        let sample = (TAU * FALLBACK_FREQUENCY * t).sin() * 0.5;
        let value = (sample * 32_767.0).floor() as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }

    out
}

/// Expected encoded size for a buffer shape.
pub fn encoded_len(frames: usize, channels: usize) -> usize {
    HEADER_LEN + frames * channels * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn header_fields_are_consistent() {
        let buffer = SampleBuffer::new(2, 100, 48_000).unwrap();
        let bytes = encode(&buffer);

        assert_eq!(bytes.len(), encoded_len(100, 2));
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 400);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 2);
        assert_eq!(u32_at(&bytes, 24), 48_000);
        assert_eq!(u32_at(&bytes, 28), 48_000 * 4);
        assert_eq!(u16_at(&bytes, 32), 4);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 400);
    }

    #[test]
    fn silent_buffer_has_zero_payload() {
        let buffer = SampleBuffer::new(1, 64, 8_000).unwrap();
        let bytes = encode(&buffer);
        assert!(bytes[HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_buffer_is_header_only() {
        let buffer = SampleBuffer::new(2, 0, 44_100).unwrap();
        let bytes = encode(&buffer);
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(u32_at(&bytes, 4), 36);
    }

    #[test]
    fn samples_are_interleaved() {
        let buffer =
            SampleBuffer::from_channels(vec![vec![1.0, 0.0], vec![-1.0, 0.5]], 8_000).unwrap();
        let bytes = encode(&buffer);
        let pcm: Vec<i16> = bytes[HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, vec![32_767, -32_768, 0, 16_383]);
    }

    #[test]
    fn conversion_clamps_and_truncates() {
        assert_eq!(sample_to_pcm16(2.0), 32_767);
        assert_eq!(sample_to_pcm16(-3.0), -32_768);
        assert_eq!(sample_to_pcm16(-0.5), -16_384);
        assert_eq!(sample_to_pcm16(0.00001), 0);
        assert_eq!(sample_to_pcm16(f32::NAN), 0);
    }

    #[test]
    fn fallback_tone_is_one_second_mono() {
        let bytes = fallback_wav();
        assert_eq!(bytes.len(), HEADER_LEN + 88_200);
        assert_eq!(u16_at(&bytes, 22), 1);
        assert_eq!(u32_at(&bytes, 24), 44_100);
        assert_eq!(u32_at(&bytes, 40), 88_200);

        let peak = bytes[HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]).unsigned_abs())
            .max()
            .unwrap();
        assert!((16_300..=16_384).contains(&peak));
    }

    #[test]
    fn format_overflow_is_detected() {
        let format = WavFormat::pcm16(u16::MAX, 768_000);
        assert!(format.block_align().is_none());
        let format = WavFormat::pcm16(30_000, 768_000);
        assert!(format.byte_rate().is_none());
    }
}
