//! Pipeline benchmarks.
//!
//! Live genre chains per block, plus the offline generate stages on a full
//! clip.

mod chains;
mod encode;
mod offline;
mod synth;

pub use chains::bench_chains;
pub use encode::bench_encode;
pub use offline::bench_offline;
pub use synth::bench_synth;
