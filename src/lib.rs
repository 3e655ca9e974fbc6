//! # tick-book-reconstructor
//!
//! L2 order book reconstruction from a checkpoint plus tick-level deltas.
//!
//! A data API delivers one full book snapshot (the checkpoint) and a log of
//! price-level changes. This crate replays the log on top of the checkpoint
//! and produces the exact book state after each change, or only the final
//! one, and reports discontinuities in the delta sequence.
//!
//! Fetching the data (HTTP, auth, pagination) is out of scope; plug it in
//! through [`source::TickDataSource`] or hand the types over directly.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use tick_book_reconstructor::{
//!     OrderBook, OrderBookReconstructor, OrderbookDelta, PriceLevel, ReconstructOptions, Side,
//! };
//!
//! let checkpoint = OrderBook::new(
//!     "BTC",
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     vec![PriceLevel::new("100", "1", 3)],
//!     vec![PriceLevel::new("102", "1", 1)],
//! );
//! let deltas = vec![
//!     OrderbookDelta::new(1_704_067_201_000, Side::Bid, 101.0, 2.0, 1),
//!     OrderbookDelta::new(1_704_067_202_000, Side::Ask, 102.0, 0.0, 2),
//! ];
//!
//! let mut book = OrderBookReconstructor::new();
//!
//! // Every intermediate state
//! let snapshots = book
//!     .reconstruct_all(&checkpoint, &deltas, &ReconstructOptions::default())
//!     .unwrap();
//! assert_eq!(snapshots.len(), 3);
//! assert_eq!(snapshots[0].mid_price.as_deref(), Some("101.0"));
//!
//! // Or lazily, one state at a time
//! for snapshot in book.iterate(&checkpoint, &deltas, Some(10)).unwrap() {
//!     println!("{} {:?} {:?}", snapshot.timestamp, snapshot.best_bid(), snapshot.best_ask());
//! }
//!
//! // Sequence discontinuities are reported as data
//! assert!(OrderBookReconstructor::detect_gaps(&deltas).is_empty());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Wire types: `OrderBook`, `PriceLevel`, `OrderbookDelta`, `ReconstructedOrderBook` |
//! | [`book`] | Reconstruction: `OrderBookReconstructor`, `Replay`, `detect_gaps` |
//! | [`source`] | Tick data sources: `TickDataSource`, `VecSource`, `JsonSource` |
//! | [`error`] | `ReconError` and the crate `Result` alias |

pub mod book;
pub mod error;
pub mod source;
pub mod types;

// Re-exports - Core types
pub use error::{ReconError, Result};
pub use types::{
    Checkpoint, OrderBook, OrderbookDelta, PriceLevel, ReconstructedOrderBook, SequenceGap, Side,
    TickData,
};

// Re-exports - Reconstruction
pub use book::{
    detect_gaps, format_decimal, reconstruct_final, reconstruct_orderbook, OrderBookReconstructor,
    ReconstructOptions, Replay, ReplayStats,
};

// Re-exports - Source abstraction
pub use source::{JsonSource, SourceMetadata, TickDataSource, VecSource};
