use crate::dsp::distortion::WaveShaper;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Waveshaper Node
===============

Runs the block through a sampled transfer curve. The Phonk chain builds it
from the distortion-amount curve (amount 50), which flattens peaks into a
gritty plateau around ±0.35 before the slapback delay.

The curve table is built once when the node is created and never touched on
the audio thread. No oversampling is applied, so very bright material will
alias a little.

Example usage:

  let mut chain = EffectChain::new();
  chain.push(WaveShaperNode::with_amount(50.0));
  chain.push(DelayNode::new(0.1));
*/

pub struct WaveShaperNode {
    shaper: WaveShaper,
    amount: f64,
}

impl WaveShaperNode {
    pub fn with_amount(amount: f64) -> Self {
        Self {
            shaper: WaveShaper::with_amount(amount),
            amount,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl GraphNode for WaveShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.shaper.render(out);
    }

    fn label(&self) -> &'static str {
        "distortion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_peaks() {
        let mut node = WaveShaperNode::with_amount(50.0);
        let mut block = vec![1.0, -1.0, 0.0];
        node.render_block(&mut block, &RenderCtx::new(44_100.0));

        assert!(block[0] < 0.4 && block[0] > 0.3);
        assert!(block[1] > -0.4 && block[1] < -0.3);
        assert!(block[2].abs() < 1e-3);
    }
}
