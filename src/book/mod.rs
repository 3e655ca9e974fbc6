//! Order book reconstruction module.
//!
//! Rebuilds L2 book state from a checkpoint plus tick-level deltas.

mod gaps;
mod level;
pub mod reconstructor;
mod replay;

pub use gaps::detect_gaps;
pub use level::format_decimal;
pub use reconstructor::{
    reconstruct_final, reconstruct_orderbook, OrderBookReconstructor, ReconstructOptions,
    ReplayStats,
};
pub use replay::Replay;
