use crate::graph::node::{GraphNode, RenderCtx};

/// Scalar gain. Used as the per-lane fader and the master bus level.
pub struct GainNode {
    gain: f32,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.max(0.0);
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if self.gain == 1.0 {
            return;
        }
        for sample in out.iter_mut() {
            *sample *= self.gain;
        }
    }

    fn label(&self) -> &'static str {
        "gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_block() {
        let mut node = GainNode::new(0.5);
        let mut block = vec![1.0, -0.5];
        node.render_block(&mut block, &RenderCtx::new(44_100.0));
        assert_eq!(block, vec![0.5, -0.25]);
    }

    #[test]
    fn negative_gain_is_floored() {
        let mut node = GainNode::new(1.0);
        node.set_gain(-2.0);
        assert_eq!(node.gain(), 0.0);
    }
}
