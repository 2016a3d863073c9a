use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Effect Chain
===================

An EffectChain runs any number of nodes in series, passing the output of
each stage into the next. It is the dynamic form of a `source → effect`
pair: genre tables decide the stages at runtime, so the chain holds boxed
nodes instead of nested generic types.

How It Works:
-------------
1. The block arrives holding the source signal
2. Each stage processes it in place, in insertion order

  Source block:   [0.5, 0.8, -0.3, 0.9, ...]
  Stage 1 (lowpass 1 kHz)
  Stage 2 (lowshelf 100 Hz +8 dB)
  Final output:   [0.6, 0.9, -0.2, 0.8, ...]

An empty chain is a plain wire.

Signal Flow Diagram:
--------------------
  [Source] ──→ [Stage 1] ──→ [Stage 2] ──→ ... ──→ output

Chains are built off the audio thread (construction allocates) and then
moved into the session, where rendering is allocation-free.
*/

#[derive(Default)]
pub struct EffectChain {
    stages: Vec<Box<dyn GraphNode>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn push<N: GraphNode + 'static>(&mut self, node: N) {
        self.stages.push(Box::new(node));
    }

    pub fn push_boxed(&mut self, node: Box<dyn GraphNode>) {
        self.stages.push(node);
    }

    pub fn with<N: GraphNode + 'static>(mut self, node: N) -> Self {
        self.push(node);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage labels in processing order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.label()).collect()
    }
}

impl GraphNode for EffectChain {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for stage in self.stages.iter_mut() {
            stage.render_block(out, ctx);
        }
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    fn label(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{delay::DelayNode, filter::FilterNode, gain::GainNode};

    fn ctx() -> RenderCtx {
        RenderCtx::new(48_000.0)
    }

    #[test]
    fn empty_chain_is_a_wire() {
        let mut chain = EffectChain::new();
        let mut block = vec![0.25; 16];
        chain.render_block(&mut block, &ctx());
        assert!(block.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn stages_run_in_order() {
        // Delay then gain: the delayed impulse comes out scaled.
        let mut chain = EffectChain::new()
            .with(DelayNode::new(2.0 / 48_000.0))
            .with(GainNode::new(0.5));
        let mut block = vec![0.0; 8];
        block[0] = 1.0;
        chain.render_block(&mut block, &ctx());

        assert_eq!(block[0], 0.0);
        assert_eq!(block[2], 0.5);
    }

    #[test]
    fn reports_stage_labels() {
        let chain = EffectChain::new()
            .with(FilterNode::lowpass(1_000.0, 1.0))
            .with(FilterNode::low_shelf(100.0, 8.0));
        assert_eq!(chain.labels(), vec!["lowpass", "lowshelf"]);
        assert_eq!(chain.len(), 2);
    }
}
