/// Context passed to graph nodes during rendering
///
/// Nodes pick up rate changes from here lazily, so a chain built before the
/// device is known still renders at the right rate.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes process a block in place: `out` arrives holding the input signal and
/// leaves holding the processed one.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Clear internal state (filter memory, delay lines, envelopes).
    ///
    /// Called on seek and restart so stale history does not bleed in.
    fn reset(&mut self) {
        // Default: stateless
    }

    /// Short name for logs and the chain table.
    fn label(&self) -> &'static str {
        "node"
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn label(&self) -> &'static str {
        (**self).label()
    }
}
