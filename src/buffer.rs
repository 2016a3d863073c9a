//! In-memory multi-channel sample buffers.
//!
//! Every stage of the studio passes audio around as a [`SampleBuffer`]:
//! the synthesizer creates one, the offline processor maps one into a new
//! one, the encoder serializes one, and the live session plays one. Channels
//! are stored planar (one `Vec<f32>` per channel) so per-channel DSP can run
//! over contiguous slices.

use crate::error::BufferError;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Create a silent buffer.
    pub fn new(channel_count: usize, frame_count: usize, sample_rate: u32) -> Result<Self, BufferError> {
        if channel_count == 0 {
            return Err(BufferError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(BufferError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            sample_rate,
            channels: vec![vec![0.0; frame_count]; channel_count],
        })
    }

    /// Wrap existing planar channel data. All channels must have the same
    /// length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, BufferError> {
        let Some(first) = channels.first() else {
            return Err(BufferError::NoChannels);
        };
        if sample_rate == 0 {
            return Err(BufferError::InvalidSampleRate { rate: sample_rate });
        }

        let expected = first.len();
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(BufferError::MismatchedChannels {
                channel,
                expected,
                found: data.len(),
            });
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a buffer from interleaved frames (`ch0, ch1, ch0, ch1, ...`).
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, BufferError> {
        if channel_count == 0 {
            return Err(BufferError::NoChannels);
        }
        let frames = samples.len() / channel_count;
        let mut buffer = Self::new(channel_count, frames, sample_rate)?;
        for (frame, chunk) in samples.chunks_exact(channel_count).enumerate() {
            for (channel, &sample) in buffer.channels.iter_mut().zip(chunk) {
                channel[frame] = sample;
            }
        }
        Ok(buffer)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// A silent buffer with the same channel count, frame count and rate.
    pub fn silent_like(&self) -> Self {
        Self {
            sample_rate: self.sample_rate,
            channels: vec![vec![0.0; self.frame_count()]; self.channel_count()],
        }
    }

    /// Produce a new buffer by running `f(channel_index, input, output)` over
    /// every channel. The source buffer is never touched.
    pub fn map_channels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, &[f32], &mut [f32]),
    {
        let mut out = self.silent_like();
        for (index, (input, output)) in self.channels.iter().zip(out.channels.iter_mut()).enumerate() {
            f(index, input, output);
        }
        out
    }

    /// Absolute peak across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }

    /// Linearly resample to `target_rate`. Returns a clone when the rate
    /// already matches.
    pub fn resampled(&self, target_rate: u32) -> Result<Self, BufferError> {
        if target_rate == 0 {
            return Err(BufferError::InvalidSampleRate { rate: target_rate });
        }
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let source_frames = self.frame_count();
        let target_frames = (source_frames as f64 / ratio).floor() as usize;

        let channels = self
            .channels
            .iter()
            .map(|input| {
                (0..target_frames)
                    .map(|i| {
                        let pos = i as f64 * ratio;
                        let index = pos.floor() as usize;
                        let frac = (pos - index as f64) as f32;
                        let a = input.get(index).copied().unwrap_or(0.0);
                        let b = input.get(index + 1).copied().unwrap_or(a);
                        a + (b - a) * frac
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            sample_rate: target_rate,
            channels,
        })
    }
}
