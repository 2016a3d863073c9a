use crate::MAX_DELAY_SAMPLES;

/// Fixed-capacity ring buffer. Capacity is allocated once so the line can
/// live inside a realtime node.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self::with_capacity(MAX_DELAY_SAMPLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Write `sample` and return the one written `delay_samples` ago.
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay_samples = delay_samples.min(len - 1);

        self.buffer[self.write_pos] = sample;

        let read_pos = (self.write_pos + len - delay_samples) % len;
        let delayed = self.buffer[read_pos];

        self.write_pos = (self.write_pos + 1) % len;

        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_out_after_delay() {
        let mut line = DelayLine::with_capacity(16);
        let mut block = [0.0f32; 8];
        block[0] = 1.0;
        line.render(&mut block, 3);

        assert_eq!(block, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn delay_is_capped_by_capacity() {
        let mut line = DelayLine::with_capacity(4);
        // Requests longer than the ring read the oldest slot.
        for i in 0..4 {
            line.next_sample(i as f32, 100);
        }
        assert_eq!(line.next_sample(9.0, 100), 1.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut line = DelayLine::with_capacity(8);
        line.next_sample(1.0, 1);
        line.reset();
        assert_eq!(line.next_sample(0.0, 1), 0.0);
    }
}
