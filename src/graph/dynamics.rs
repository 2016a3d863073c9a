use crate::{
    dsp::dynamics::{Compressor, CompressorParams},
    graph::node::{GraphNode, RenderCtx},
};

/// Compressor stage. Each channel lane owns its own detector, so stereo
/// sources are compressed per channel rather than linked.
pub struct CompressorNode {
    compressor: Compressor,
}

impl CompressorNode {
    pub fn new(params: CompressorParams) -> Self {
        Self {
            compressor: Compressor::new(params, 48_000.0),
        }
    }
}

impl GraphNode for CompressorNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.compressor.set_sample_rate(ctx.sample_rate as f64);
        self.compressor.render(out);
    }

    fn reset(&mut self) {
        self.compressor.reset();
    }

    fn label(&self) -> &'static str {
        "compressor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tames_a_hot_block() {
        let mut node = CompressorNode::new(CompressorParams::default());
        let ctx = RenderCtx::new(44_100.0);
        let mut block = vec![0.9; crate::MAX_BLOCK_SIZE];
        for _ in 0..8 {
            block.fill(0.9);
            node.render_block(&mut block, &ctx);
        }
        assert!(block[block.len() - 1] < 0.2);
    }
}
