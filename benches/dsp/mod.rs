//! Low-level DSP primitive benchmarks.

mod dynamics;
mod filter;

pub use dynamics::bench_dynamics;
pub use filter::bench_filter;
