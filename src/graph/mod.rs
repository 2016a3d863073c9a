//! Composable building blocks for the live effect graph.
//!
//! Graph nodes wrap the low-level DSP primitives for block-based, in-place
//! rendering. Genre chains are assembled from these nodes at runtime and
//! moved into the audio session.

/// Serial chain of boxed nodes.
pub mod chain;
/// Pure delay stage.
pub mod delay;
/// Table-driven waveshaper stage.
pub mod distortion;
/// Compressor stage.
pub mod dynamics;
/// Biquad equalizer stage.
pub mod filter;
/// Scalar gain (faders, master bus).
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;

pub use chain::EffectChain;
pub use node::{GraphNode, RenderCtx};
