use crate::{
    dsp::delay::DelayLine,
    graph::node::{GraphNode, RenderCtx},
};

/// Pure delay: the block comes out `delay_seconds` later with no dry signal
/// and no feedback.
pub struct DelayNode {
    delay_line: DelayLine,
    delay_seconds: f32,
}

impl DelayNode {
    pub fn new(delay_seconds: f32) -> Self {
        Self {
            delay_line: DelayLine::new(),
            delay_seconds: delay_seconds.max(0.0),
        }
    }

    pub fn delay_seconds(&self) -> f32 {
        self.delay_seconds
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let delay_samples = (self.delay_seconds * ctx.sample_rate).round() as usize;
        self.delay_line.render(out, delay_samples);
    }

    fn reset(&mut self) {
        // Clear the ring so a seek does not replay old audio
        self.delay_line.reset();
    }

    fn label(&self) -> &'static str {
        "delay"
    }
}
